//! The change log model.
//!
//! A [`Change`] records one field mutation; a [`ChangeLog`] is the ordered
//! history of changes attached to an account. The log is a write-optimized
//! history, not authoritative truth: reads use the materialized field
//! values, and the log is only replayed during merge.

use crate::types::{ChangeId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a field mutation.
///
/// This is a closed set; unknown kinds are rejected at deserialization,
/// never at merge time. For a given field a `set` logically supersedes
/// every change with an earlier timestamp, while `increment` and `append`
/// commute with each other but not with a `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Replace the field's value.
    Set,
    /// Add a numeric delta to the field.
    Increment,
    /// Push a value onto the field's sequence.
    Append,
}

/// One recorded field mutation.
///
/// Changes are never mutated after creation. The id exists so clients can
/// prune their pending-change buffers after a merge; it is not consulted
/// for idempotence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Change {
    /// Unique change id.
    #[serde(rename = "_id")]
    pub id: ChangeId,
    /// Wall-clock time the mutation was made.
    pub date: Timestamp,
    /// What kind of mutation this is.
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// The field being mutated.
    pub field: String,
    /// The new value, delta, or appended element, depending on kind.
    pub value: Value,
}

impl Change {
    /// Creates a change stamped with the current time and a fresh id.
    pub fn new(kind: ChangeKind, field: impl Into<String>, value: Value) -> Self {
        Self {
            id: ChangeId::fresh(),
            date: Timestamp::now(),
            kind,
            field: field.into(),
            value,
        }
    }
}

/// The ordered history of changes attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeLog(Vec<Change>);

impl ChangeLog {
    /// Creates an empty change log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a change at the end of the log.
    ///
    /// The caller re-sorts afterwards when append order differs from
    /// timestamp order (the merge does this once at the end).
    pub fn push(&mut self, change: Change) {
        self.0.push(change);
    }

    /// Keeps only the changes matching the predicate.
    pub fn retain(&mut self, f: impl FnMut(&Change) -> bool) {
        self.0.retain(f);
    }

    /// Re-sorts the log ascending by timestamp.
    ///
    /// The sort is stable, so entries with equal timestamps keep their
    /// insertion order. Equal-timestamp behavior is implementation-defined,
    /// not a contract.
    pub fn sort_by_date(&mut self) {
        self.0.sort_by_key(|c| c.date);
    }

    /// Returns true if the log contains a `set` for `field` with a
    /// timestamp strictly greater than `date`.
    #[must_use]
    pub fn has_newer_set(&self, field: &str, date: Timestamp) -> bool {
        self.0
            .iter()
            .any(|c| c.kind == ChangeKind::Set && c.field == field && c.date > date)
    }

    /// Iterates over the entries in log order.
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.0.iter()
    }

    /// Iterates over the entries for a single field.
    pub fn entries_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Change> {
        self.0.iter().filter(move |c| c.field == field)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the log has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Change>> for ChangeLog {
    fn from(changes: Vec<Change>) -> Self {
        Self(changes)
    }
}
