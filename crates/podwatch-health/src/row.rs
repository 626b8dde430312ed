//! Row parser for `kubectl get pods -o wide --no-headers` output.
//!
//! Canonical column order is
//! `NAME READY STATUS RESTARTS AGE IP NODE NOMINATED-NODE READINESS-GATES`.
//! The orchestrator may insert a parenthesized annotation after the restart
//! count (`3 (5m ago)`, `1 (1/2)`), which shifts every later column right by
//! a variable number of tokens. Layout detection runs on the token list
//! first; field extraction then reads from the detected layout.

use std::net::IpAddr;

use tracing::debug;

use podwatch_core::StatusRow;

/// Rows with fewer tokens are headers or truncated output.
pub const MIN_FIELDS: usize = 9;

const NAME: usize = 0;
const PHASE: usize = 2;
const RESTARTS: usize = 3;
const ANNOTATION: usize = 4;
const IP: usize = 5;
const NODE: usize = 6;
/// Last token (inclusive) that may close an annotation.
const ANNOTATION_SCAN_END: usize = 6;

/// Placeholder the orchestrator prints for an unassigned ip or node.
const NONE_MARKER: &str = "<none>";

/// Split a line on runs of whitespace.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Where the ip/node columns sit relative to an annotation's closing token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The age column follows the annotation: ip at `close + 2`.
    AfterAge,
    /// The annotation took the age column's place: ip at `close + 1`.
    DisplacedAge,
}

/// Column layout of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Canonical,
    Annotated {
        /// Index of the token ending with `)`.
        close: usize,
        anchor: Anchor,
    },
}

impl Layout {
    /// Detect the layout of a tokenized row.
    ///
    /// Returns `None` when an annotation is present but the tokens needed to
    /// re-anchor on it are missing.
    pub fn detect(tokens: &[&str]) -> Option<Layout> {
        let opens = tokens.get(ANNOTATION).is_some_and(|t| t.starts_with('('));
        if !opens {
            return Some(Layout::Canonical);
        }

        let last = ANNOTATION_SCAN_END.min(tokens.len().saturating_sub(1));
        let Some(close) = (ANNOTATION..=last).find(|&i| tokens[i].ends_with(')')) else {
            debug!(annotation = tokens[ANNOTATION], "unterminated annotation, keeping canonical layout");
            return Some(Layout::Canonical);
        };

        let anchor = if is_address_like(tokens.get(close + 1)?) {
            Anchor::DisplacedAge
        } else {
            Anchor::AfterAge
        };
        Some(Layout::Annotated { close, anchor })
    }

    pub fn ip_index(&self) -> usize {
        match *self {
            Layout::Canonical => IP,
            Layout::Annotated { close, anchor: Anchor::AfterAge } => close + 2,
            Layout::Annotated { close, anchor: Anchor::DisplacedAge } => close + 1,
        }
    }

    pub fn node_index(&self) -> usize {
        self.ip_index() + 1
    }
}

fn is_address_like(token: &str) -> bool {
    token == NONE_MARKER || token.parse::<IpAddr>().is_ok()
}

fn column(token: &str) -> &str {
    if token == NONE_MARKER { "" } else { token }
}

/// Extra locations encoded by an annotation.
///
/// `(used/total)` yields `total - used`; annotations without that shape
/// (such as `(5m ago)`) yield zero.
fn overflow_count(annotation: &[&str]) -> u32 {
    let joined = annotation.join(" ");
    let inner = joined.trim_start_matches('(').trim_end_matches(')');
    inner
        .split_once('/')
        .and_then(|(used, total)| {
            let used = used.trim().parse::<u32>().ok()?;
            let total = total.trim().parse::<u32>().ok()?;
            Some(total.saturating_sub(used))
        })
        .unwrap_or(0)
}

/// Parse one status line. Returns `None` for anything that is not a
/// complete status row; this never fails harder than that.
pub fn parse_row(line: &str) -> Option<StatusRow> {
    let tokens = tokenize(line);
    if tokens.len() < MIN_FIELDS {
        return None;
    }

    let Ok(restart_count) = tokens[RESTARTS].parse::<u32>() else {
        debug!(line, restarts = tokens[RESTARTS], "discarding row with bad restart count");
        return None;
    };

    let Some(layout) = Layout::detect(&tokens) else {
        debug!(line, "discarding row whose annotation cannot be re-anchored");
        return None;
    };

    let (Some(ip), Some(node)) = (tokens.get(layout.ip_index()), tokens.get(layout.node_index())) else {
        debug!(line, ?layout, "discarding row with ip/node out of range");
        return None;
    };

    let row = StatusRow::new(tokens[NAME], tokens[PHASE], restart_count, column(ip), column(node));
    Some(match layout {
        Layout::Canonical => row,
        Layout::Annotated { close, .. } => row.with_overflow(overflow_count(&tokens[ANNOTATION..=close])),
    })
}

/// Parse every status row in captured command output, in input order.
pub fn parse_rows(output: &str) -> Vec<StatusRow> {
    output.lines().filter_map(parse_row).collect()
}
