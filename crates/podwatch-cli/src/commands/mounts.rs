//! `podwatch mounts` — driver FUSE mount check.

use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use podwatch_core::{PodwatchConfig, Verdict};
use podwatch_health::{MountCheck, MountProbe};

use super::read_capture;

#[derive(Debug, Clone, Default, Args)]
pub struct MountArgs {
    /// Mount table to read ("-" for stdin; default from config, /proc/mounts)
    #[arg(long)]
    pub table: Option<PathBuf>,
}

/// Probes mount points on the local filesystem.
///
/// A mount point is live when it can be stat'ed, is a directory, and sits
/// on a different device than its parent. A disconnected FUSE mount fails
/// the stat.
pub struct FsProbe;

impl MountProbe for FsProbe {
    fn is_active(&self, mountpoint: &Path) -> bool {
        let meta = match fs::metadata(mountpoint) {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %mountpoint.display(), error = %e, "mount point stat failed");
                return false;
            }
        };
        if !meta.is_dir() {
            return false;
        }
        let Some(parent) = mountpoint.parent() else {
            return true;
        };
        match fs::metadata(parent) {
            Ok(parent_meta) => parent_meta.dev() != meta.dev(),
            Err(_) => false,
        }
    }
}

pub fn run(args: &MountArgs, config: &PodwatchConfig) -> Result<Verdict> {
    let table_path = args.table.as_deref().unwrap_or(config.mounts.table.as_path());
    let table = read_capture(table_path)?;

    let check = MountCheck::new(config.mounts.sources.clone()).with_subject(config.check.subject.as_str());
    let verdict = check.evaluate(&table, &FsProbe);

    info!(table = %table_path.display(), code = %verdict.code, "mount check complete");
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use podwatch_core::StatusCode;

    #[test]
    fn test_root_is_a_mount_point() {
        assert!(FsProbe.is_active(Path::new("/")));
    }

    #[test]
    fn test_plain_directory_is_not_a_mount_point() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("mnt");
        fs::create_dir(&sub).unwrap();
        assert!(!FsProbe.is_active(&sub));
    }

    #[test]
    fn test_missing_path_is_not_active() {
        assert!(!FsProbe.is_active(Path::new("/nonexistent/irods/mount")));
    }

    #[test]
    fn test_run_reports_dead_mounts() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("mounts");
        fs::write(
            &table,
            "/dev/sda1 / ext4 rw 0 0\nirodsfs /nonexistent/pv-1/mount fuse rw 0 0\n",
        )
        .unwrap();

        let args = MountArgs { table: Some(table) };
        let v = run(&args, &PodwatchConfig::default()).unwrap();
        assert_eq!(v.code, StatusCode::Critical);
        assert_eq!(
            v.message,
            "CRITICAL - Found failed iRODS CSI Driver mount points at [/nonexistent/pv-1/mount]."
        );
    }

    #[test]
    fn test_run_missing_table_is_an_error() {
        let args = MountArgs {
            table: Some(PathBuf::from("/nonexistent/mounts")),
        };
        assert!(run(&args, &PodwatchConfig::default()).is_err());
    }
}
