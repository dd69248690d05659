//! The persisted per-user account record.

use crate::change::ChangeLog;
use crate::types::{AccountId, Timestamp};
use crate::validation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A persisted account: a field map plus its change log.
///
/// Field names are opaque and case-sensitive. Internal fields (names
/// beginning with [`validation::INTERNAL_PREFIX`]) live in the same map
/// but are stripped from all wire output. The current field values are
/// always derivable by replaying the change log, but reads use the
/// materialized values; only the merge replays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque identity, assigned once at creation.
    #[serde(rename = "_id")]
    pub id: AccountId,
    /// Creation time.
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    /// Last-modified time, stamped by the storage adapter on persist.
    #[serde(rename = "updatedAt")]
    pub updated_at: Timestamp,
    /// The ordered mutation history scoped to this account.
    #[serde(rename = "__changelog", default)]
    pub changelog: ChangeLog,
    /// Field values, internal fields included.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Account {
    /// Creates an empty account with a fresh id and current timestamps.
    #[must_use]
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            id: AccountId::fresh(),
            created_at: now,
            updated_at: now,
            changelog: ChangeLog::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Returns the account's email, if one is set.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.fields.get("email").and_then(Value::as_str)
    }

    /// Returns the field map with internal fields stripped, for wire
    /// output (`userData`).
    ///
    /// Includes `_id`, `createdAt`, and `updatedAt` alongside the
    /// user-facing fields.
    #[must_use]
    pub fn stripped_data(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("_id".into(), Value::String(self.id.0.clone()));
        out.insert("createdAt".into(), Value::from(self.created_at.as_millis()));
        out.insert("updatedAt".into(), Value::from(self.updated_at.as_millis()));
        for (name, value) in &self.fields {
            if !validation::is_internal_field(name) {
                out.insert(name.clone(), value.clone());
            }
        }
        out
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}
