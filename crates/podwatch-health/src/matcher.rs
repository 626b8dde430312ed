//! Selection of the rows that belong to the node being checked.

use podwatch_core::{Identities, StatusRow};

/// Whether a row's ip or node equals one of the candidate identities.
pub fn matches(row: &StatusRow, identities: &Identities) -> bool {
    identities.contains(row.ip()) || identities.contains(row.node())
}

/// Rows matched against a set of candidate identities, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    rows: Vec<StatusRow>,
}

impl MatchSet {
    /// Keep the rows whose ip or node matches any candidate.
    pub fn select(rows: impl IntoIterator<Item = StatusRow>, identities: &Identities) -> Self {
        Self {
            rows: rows.into_iter().filter(|row| matches(row, identities)).collect(),
        }
    }

    /// Wrap rows that are already known to belong to the node.
    pub fn from_rows(rows: Vec<StatusRow>) -> Self {
        Self { rows }
    }

    /// Narrow the set to rows whose name starts with `prefix`.
    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.rows.retain(|row| row.name().starts_with(prefix));
        self
    }

    pub fn rows(&self) -> &[StatusRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatusRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a StatusRow;
    type IntoIter = std::slice::Iter<'a, StatusRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
