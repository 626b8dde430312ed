//! Shared types used across podwatch crates.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Status rows ────────────────────────────────────────────────────

/// One workload instance as reported by a `kubectl get pods -o wide` row.
///
/// Rows are immutable once built. `ip` and `node` are empty when the
/// orchestrator reports them as `<none>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    name: String,
    phase: String,
    restart_count: u32,
    ip: String,
    node: String,
    overflow_count: Option<u32>,
}

impl StatusRow {
    pub fn new(
        name: impl Into<String>,
        phase: impl Into<String>,
        restart_count: u32,
        ip: impl Into<String>,
        node: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phase: phase.into(),
            restart_count,
            ip: ip.into(),
            node: node.into(),
            overflow_count: None,
        }
    }

    /// Mark the row as spanning more locations than the listed one.
    pub fn with_overflow(mut self, overflow_count: u32) -> Self {
        self.overflow_count = Some(overflow_count);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> &str {
        &self.phase
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn node(&self) -> &str {
        &self.node
    }

    /// Additional unlisted locations, present only for annotated rows.
    pub fn overflow_count(&self) -> Option<u32> {
        self.overflow_count
    }

    /// Whether the phase is `running` (case-insensitive).
    pub fn is_running(&self) -> bool {
        self.phase.eq_ignore_ascii_case("running")
    }

    /// Display label used in verdict messages: `name(node)`.
    pub fn label(&self) -> String {
        format!("{}({})", self.name, self.node)
    }
}

// ── Candidate identities ───────────────────────────────────────────

/// Ordered, de-duplicated set of hostnames, FQDNs, and IP addresses that
/// identify the node being checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identities(Vec<String>);

impl Identities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity, skipping blanks and duplicates.
    pub fn push(&mut self, identity: impl Into<String>) {
        let identity = identity.into();
        let identity = identity.trim();
        if identity.is_empty() || self.contains(identity) {
            return;
        }
        self.0.push(identity.to_string());
    }

    /// Exact string match against any candidate.
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|candidate| candidate == value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Identities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut identities = Identities::new();
        for identity in iter {
            identities.push(identity);
        }
        identities
    }
}

impl<S: Into<String>> Extend<S> for Identities {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for identity in iter {
            self.push(identity);
        }
    }
}

// ── Thresholds ─────────────────────────────────────────────────────

/// Restart-count thresholds. Comparisons are strict (`>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub warn: u32,
    pub crit: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { warn: 3, crit: 10 }
    }
}

// ── Verdicts ───────────────────────────────────────────────────────

/// Monitoring-system status code. The numeric values are the plugin exit
/// status convention and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusCode {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl StatusCode {
    /// Numeric exit status: OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3.
    pub fn as_i32(self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Warning => 1,
            StatusCode::Critical => 2,
            StatusCode::Unknown => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Warning => "WARNING",
            StatusCode::Critical => "CRITICAL",
            StatusCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one evaluation: a status code and a single-line message
/// prefixed with the code's label, e.g. `CRITICAL - ...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub code: StatusCode,
    pub message: String,
    /// Labels of the instances the message lists, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instances: Vec<String>,
}

impl Verdict {
    pub fn new(code: StatusCode, text: impl fmt::Display) -> Self {
        Self {
            code,
            message: format!("{} - {}", code.label(), text),
            instances: Vec::new(),
        }
    }

    pub fn with_instances(mut self, instances: Vec<String>) -> Self {
        self.instances = instances;
        self
    }

    /// Verdict for a check that could not determine its target or input.
    pub fn unknown(text: impl fmt::Display) -> Self {
        Self::new(StatusCode::Unknown, text)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.as_i32()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
