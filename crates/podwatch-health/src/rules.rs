//! Health evaluation as ordered rule tables.
//!
//! Each policy is a list of rules evaluated top-down; the first rule that
//! fires produces the verdict. Absence and duplication come before restart
//! churn, and critical restarts before warning restarts, so one evaluation
//! only ever reports its most severe condition.

use tracing::debug;

use podwatch_core::{StatusCode, StatusRow, Thresholds, Verdict};

use crate::matcher::MatchSet;

/// Subject named in verdict messages when the caller does not set one.
pub const DEFAULT_SUBJECT: &str = "iRODS CSI Driver";

// ── Census ─────────────────────────────────────────────────────────

/// Running/stopped partition of a match set.
#[derive(Debug)]
pub struct Census<'a> {
    pub running: Vec<&'a StatusRow>,
    pub stopped: Vec<&'a StatusRow>,
    pub thresholds: Thresholds,
}

impl<'a> Census<'a> {
    pub fn new(rows: &'a MatchSet, thresholds: Thresholds) -> Self {
        let (running, stopped): (Vec<_>, Vec<_>) = rows.iter().partition(|row| row.is_running());
        Self {
            running,
            stopped,
            thresholds,
        }
    }

    /// Running rows restarted more than `limit` times.
    pub fn restarted_over(&self, limit: u32) -> Vec<&'a StatusRow> {
        self.running
            .iter()
            .copied()
            .filter(|row| row.restart_count() > limit)
            .collect()
    }
}

fn labels(rows: &[&StatusRow]) -> Vec<String> {
    rows.iter().map(|row| row.label()).collect()
}

// ── Rules ──────────────────────────────────────────────────────────

/// Message inputs available to a rule's text.
pub struct MessageContext<'a> {
    pub subject: &'a str,
    pub thresholds: Thresholds,
    /// Listed labels joined with ", ".
    pub listed: String,
}

/// One row of a rule table.
pub struct Rule {
    pub name: &'static str,
    pub code: StatusCode,
    /// Returns the labels to list when the rule fires.
    fires: fn(&Census<'_>) -> Option<Vec<String>>,
    text: fn(&MessageContext<'_>) -> String,
}

impl Rule {
    pub const fn new(
        name: &'static str,
        code: StatusCode,
        fires: fn(&Census<'_>) -> Option<Vec<String>>,
        text: fn(&MessageContext<'_>) -> String,
    ) -> Self {
        Self {
            name,
            code,
            fires,
            text,
        }
    }

    pub fn fires(&self, census: &Census<'_>) -> Option<Vec<String>> {
        (self.fires)(census)
    }
}

fn quiet_singleton(c: &Census<'_>) -> Option<Vec<String>> {
    let quiet = c.running.len() == 1
        && c.stopped.is_empty()
        && c.restarted_over(c.thresholds.warn).is_empty();
    quiet.then(Vec::new)
}

fn quiet(c: &Census<'_>) -> Option<Vec<String>> {
    (c.stopped.is_empty() && c.restarted_over(c.thresholds.warn).is_empty()).then(Vec::new)
}

fn none_running(c: &Census<'_>) -> Option<Vec<String>> {
    c.running.is_empty().then(Vec::new)
}

fn multiple_running(c: &Census<'_>) -> Option<Vec<String>> {
    (c.running.len() > 1).then(|| labels(&c.running))
}

fn any_stopped(c: &Census<'_>) -> Option<Vec<String>> {
    (!c.stopped.is_empty()).then(|| labels(&c.stopped))
}

fn over_crit(c: &Census<'_>) -> Option<Vec<String>> {
    let rows = c.restarted_over(c.thresholds.crit);
    (!rows.is_empty()).then(|| labels(&rows))
}

fn over_warn(c: &Census<'_>) -> Option<Vec<String>> {
    let rows = c.restarted_over(c.thresholds.warn);
    (!rows.is_empty()).then(|| labels(&rows))
}

fn always(_: &Census<'_>) -> Option<Vec<String>> {
    Some(Vec::new())
}

fn running_well(m: &MessageContext<'_>) -> String {
    format!("{} is running well.", m.subject)
}

fn not_running(m: &MessageContext<'_>) -> String {
    format!("{} is not running. No instance running.", m.subject)
}

fn running_duplicates(m: &MessageContext<'_>) -> String {
    format!(
        "{} is running more than 1 instance. Running instances are [{}].",
        m.subject, m.listed
    )
}

fn failed_instances(m: &MessageContext<'_>) -> String {
    format!("{} is not running. Failed instances are [{}].", m.subject, m.listed)
}

fn crit_restarts(m: &MessageContext<'_>) -> String {
    format!(
        "{} restarted more than {} times. Restarted instances are [{}]. Check irodsfs mounts.",
        m.subject, m.thresholds.crit, m.listed
    )
}

fn warn_restarts(m: &MessageContext<'_>) -> String {
    format!(
        "{} restarted more than {} times. Restarted instances are [{}]. Check irodsfs mounts.",
        m.subject, m.thresholds.warn, m.listed
    )
}

fn status_unknown(m: &MessageContext<'_>) -> String {
    format!("{} status unknown.", m.subject)
}

/// Last row of every table; fires on any census.
pub const FALLBACK: Rule = Rule::new("fallback", StatusCode::Unknown, always, status_unknown);

/// One node-local instance expected, no restarts beyond thresholds.
pub const SINGLETON_RULES: &[Rule] = &[
    Rule::new("healthy-singleton", StatusCode::Ok, quiet_singleton, running_well),
    Rule::new("none-running", StatusCode::Critical, none_running, not_running),
    Rule::new("multiple-running", StatusCode::Critical, multiple_running, running_duplicates),
    Rule::new("stopped", StatusCode::Critical, any_stopped, failed_instances),
    Rule::new("critical-restarts", StatusCode::Critical, over_crit, crit_restarts),
    Rule::new("warning-restarts", StatusCode::Warning, over_warn, warn_restarts),
    FALLBACK,
];

/// Restart churn and stopped instances only; instance count is not checked.
pub const RESTART_RULES: &[Rule] = &[
    Rule::new("quiet", StatusCode::Ok, quiet, running_well),
    Rule::new("stopped", StatusCode::Critical, any_stopped, failed_instances),
    Rule::new("critical-restarts", StatusCode::Critical, over_crit, crit_restarts),
    Rule::new("warning-restarts", StatusCode::Warning, over_warn, warn_restarts),
    FALLBACK,
];

// ── Evaluator ──────────────────────────────────────────────────────

/// Which rule table an evaluator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    #[default]
    Singleton,
    RestartsOnly,
}

impl Policy {
    pub fn rules(self) -> &'static [Rule] {
        match self {
            Policy::Singleton => SINGLETON_RULES,
            Policy::RestartsOnly => RESTART_RULES,
        }
    }
}

/// The rule that fired and the verdict it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub rule: &'static str,
    pub verdict: Verdict,
}

#[derive(Debug, Clone)]
pub struct Evaluator {
    policy: Policy,
    thresholds: Thresholds,
    subject: String,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

impl Evaluator {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            thresholds: Thresholds::default(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Walk the rule table and report the first rule that fires.
    pub fn decide(&self, rows: &MatchSet) -> Decision {
        let census = Census::new(rows, self.thresholds);
        let rules = self.policy.rules();

        let (rule, listed) = rules
            .iter()
            .find_map(|rule| rule.fires(&census).map(|listed| (rule, listed)))
            .unwrap_or((&FALLBACK, Vec::new()));

        debug!(
            rule = rule.name,
            code = %rule.code,
            running = census.running.len(),
            stopped = census.stopped.len(),
            "health rule fired"
        );

        let context = self.context(listed.join(", "));
        Decision {
            rule: rule.name,
            verdict: Verdict::new(rule.code, (rule.text)(&context)).with_instances(listed),
        }
    }

    pub fn evaluate(&self, rows: &MatchSet) -> Verdict {
        self.decide(rows).verdict
    }

    fn context(&self, listed: String) -> MessageContext<'_> {
        MessageContext {
            subject: &self.subject,
            thresholds: self.thresholds,
            listed,
        }
    }
}

/// Evaluate a match set with the singleton policy.
pub fn evaluate(rows: &MatchSet, thresholds: Thresholds) -> Verdict {
    Evaluator::default().with_thresholds(thresholds).evaluate(rows)
}
