//! Mount table classification.
//!
//! Reads `/proc/mounts`-format text (`source mountpoint fstype options ...`)
//! and checks every mount whose source belongs to the driver with a
//! caller-supplied probe.

use std::path::{Path, PathBuf};

use tracing::debug;

use podwatch_core::{StatusCode, Verdict};

use crate::rules::DEFAULT_SUBJECT;

/// Decides whether a mount point is live.
pub trait MountProbe {
    fn is_active(&self, mountpoint: &Path) -> bool;
}

impl<F> MountProbe for F
where
    F: Fn(&Path) -> bool,
{
    fn is_active(&self, mountpoint: &Path) -> bool {
        self(mountpoint)
    }
}

/// One mount table line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub source: String,
    pub mountpoint: PathBuf,
    pub fstype: String,
}

/// Parse a mount table line. Lines with fewer than three fields are skipped.
pub fn parse_mount_line(line: &str) -> Option<MountEntry> {
    let mut fields = line.split_whitespace();
    let source = fields.next()?;
    let mountpoint = fields.next()?;
    let fstype = fields.next()?;
    Some(MountEntry {
        source: source.to_string(),
        mountpoint: PathBuf::from(unescape(mountpoint)),
        fstype: fstype.to_string(),
    })
}

/// Decode the kernel's `\ooo` octal escapes (`\040` is a space).
fn unescape(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() && is_octal_escape(&bytes[i + 1..i + 4]) {
            let value = bytes[i + 1..i + 4]
                .iter()
                .fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn is_octal_escape(digits: &[u8]) -> bool {
    digits.iter().all(|b| (b'0'..=b'7').contains(b))
}

#[derive(Debug, Clone)]
pub struct MountCheck {
    sources: Vec<String>,
    subject: String,
}

impl Default for MountCheck {
    fn default() -> Self {
        Self::new(vec!["irodsfs".to_string()])
    }
}

impl MountCheck {
    pub fn new(sources: Vec<String>) -> Self {
        Self {
            sources,
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    fn owns(&self, entry: &MountEntry) -> bool {
        self.sources.iter().any(|s| s.eq_ignore_ascii_case(&entry.source))
    }

    /// Driver-owned mounts in table order.
    pub fn driver_mounts(&self, table: &str) -> Vec<MountEntry> {
        table
            .lines()
            .filter_map(parse_mount_line)
            .filter(|entry| self.owns(entry))
            .collect()
    }

    pub fn evaluate(&self, table: &str, probe: &impl MountProbe) -> Verdict {
        let mounts = self.driver_mounts(table);
        let failed: Vec<String> = mounts
            .iter()
            .filter(|entry| !probe.is_active(&entry.mountpoint))
            .map(|entry| entry.mountpoint.display().to_string())
            .collect();

        debug!(total = mounts.len(), failed = failed.len(), "mount table checked");

        if failed.is_empty() {
            return Verdict::new(
                StatusCode::Ok,
                format!("{} mounts are healthy ({} active).", self.subject, mounts.len()),
            );
        }

        Verdict::new(
            StatusCode::Critical,
            format!(
                "Found failed {} mount points at [{}].",
                self.subject,
                failed.join(", ")
            ),
        )
        .with_instances(failed)
    }
}
