//! podwatch-health — the pure core of the podwatch checks.
//!
//! Turns captured `kubectl get pods -o wide` output into a monitoring
//! verdict. Nothing in this crate runs commands, resolves hostnames, or
//! touches the filesystem; callers hand in text and candidate identities.
//!
//! # Architecture
//!
//! ```text
//! captured output
//!   ├── row::parse_rows()        tokenize → Layout::detect → StatusRow
//!   ├── MatchSet::select()       keep rows whose ip/node is a candidate identity
//!   └── Evaluator::decide()      first firing rule of the policy's table → Verdict
//! ```
//!
//! # Rule tables
//!
//! `Policy::Singleton` expects exactly one running instance per node and
//! walks absence → duplication → stopped → critical restarts → warning
//! restarts → fallback. `Policy::RestartsOnly` skips the instance-count
//! rules. Restart thresholds compare strictly (`>`).
//!
//! Mount checks (`mounts`) classify `/proc/mounts`-format text through a
//! caller-supplied [`mounts::MountProbe`].

pub mod matcher;
pub mod mounts;
pub mod row;
pub mod rules;

pub use matcher::MatchSet;
pub use mounts::{MountCheck, MountProbe};
pub use row::{parse_row, parse_rows};
pub use rules::{evaluate, Decision, Evaluator, Policy};

use podwatch_core::{Identities, Thresholds, Verdict};

/// Parse, match, and evaluate captured output in one pass.
pub fn check_output(output: &str, identities: &Identities, evaluator: &Evaluator) -> Verdict {
    let rows = MatchSet::select(parse_rows(output), identities);
    evaluator.evaluate(&rows)
}

/// [`check_output`] with the singleton policy and the given thresholds.
pub fn check_pods(output: &str, identities: &Identities, thresholds: Thresholds) -> Verdict {
    check_output(output, identities, &Evaluator::default().with_thresholds(thresholds))
}
