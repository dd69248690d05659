//! The account handle: validated field access plus change recording.

use crate::account::Account;
use crate::change::{Change, ChangeKind};
use crate::error::{DomainError, DomainResult};
use crate::validation;
use crate::value::{add_numbers, negate_number};
use serde_json::{Number, Value};

/// Wraps an account's field values together with its mutation log.
///
/// Every mutation validates the field name, updates the materialized
/// value, and appends a change stamped with the current time. All of this
/// is in-process and synchronous; the handle performs no I/O and never
/// touches `updated_at` (the storage adapter stamps that on persist).
///
/// Local calls are always chronological, so [`AccountHandle::set`]
/// discards every prior log entry for the field. The merge, which sees
/// changes out of order, prunes by timestamp instead.
#[derive(Debug)]
pub struct AccountHandle {
    account: Account,
}

impl AccountHandle {
    /// Wraps a loaded account.
    #[must_use]
    pub fn new(account: Account) -> Self {
        Self { account }
    }

    /// Returns the wrapped account.
    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Returns the wrapped account mutably.
    ///
    /// Used by the sync engine, which applies remote changes with its own
    /// timestamp-aware pruning rather than through the mutators below.
    pub fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }

    /// Unwraps into the account, e.g. for persisting.
    #[must_use]
    pub fn into_account(self) -> Account {
        self.account
    }

    /// Reads a field value. Absent fields read as `null`.
    ///
    /// The identity field `_id` is readable; otherwise the name must be
    /// alphanumeric.
    pub fn get(&self, field: &str) -> DomainResult<Value> {
        if field == validation::ID_FIELD {
            return Ok(Value::String(self.account.id.0.clone()));
        }
        if !validation::is_valid_field_name(field) {
            return Err(DomainError::invalid_field_name(field));
        }
        Ok(self.account.fields.get(field).cloned().unwrap_or(Value::Null))
    }

    /// Replaces a field's value.
    ///
    /// Discards every prior change log entry for the field and appends a
    /// fresh `set` change stamped now.
    pub fn set(&mut self, field: &str, value: Value) -> DomainResult<()> {
        if !validation::is_valid_field_name(field) {
            return Err(DomainError::invalid_field_name(field));
        }

        self.account
            .fields
            .insert(field.to_string(), value.clone());
        self.account.changelog.retain(|c| c.field != field);
        self.account
            .changelog
            .push(Change::new(ChangeKind::Set, field, value));
        Ok(())
    }

    /// Adds 1 to a numeric field.
    pub fn increment(&mut self, field: &str) -> DomainResult<()> {
        self.increment_by(field, Number::from(1))
    }

    /// Adds `delta` to a numeric field.
    ///
    /// An absent field is treated as 0; a present non-numeric value fails.
    pub fn increment_by(&mut self, field: &str, delta: Number) -> DomainResult<()> {
        if !validation::is_valid_field_name(field) {
            return Err(DomainError::invalid_field_name(field));
        }

        let current = self
            .account
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Number(Number::from(0)));
        *current = add_numbers(current, &Value::Number(delta.clone())).ok_or_else(|| {
            DomainError::invalid_change_type(format!("can only increment number fields ({field})"))
        })?;

        self.account.changelog.push(Change::new(
            ChangeKind::Increment,
            field,
            Value::Number(delta),
        ));
        Ok(())
    }

    /// Subtracts 1 from a numeric field.
    pub fn decrement(&mut self, field: &str) -> DomainResult<()> {
        self.decrement_by(field, Number::from(1))
    }

    /// Subtracts `delta` from a numeric field.
    ///
    /// Recorded as an `increment` change with a negated delta.
    pub fn decrement_by(&mut self, field: &str, delta: Number) -> DomainResult<()> {
        self.increment_by(field, negate_number(&delta))
    }

    /// Pushes a value onto a sequence field.
    ///
    /// An absent field is treated as an empty sequence; a present
    /// non-sequence value fails.
    pub fn append(&mut self, field: &str, value: Value) -> DomainResult<()> {
        if !validation::is_valid_field_name(field) {
            return Err(DomainError::invalid_field_name(field));
        }

        let current = self
            .account
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match current {
            Value::Array(items) => items.push(value.clone()),
            _ => {
                return Err(DomainError::invalid_change_type(format!(
                    "can only append to array fields ({field})"
                )))
            }
        }

        self.account
            .changelog
            .push(Change::new(ChangeKind::Append, field, value));
        Ok(())
    }

    /// Writes an internal field (storage-layer/credential use only).
    ///
    /// The name must carry the internal prefix. No change is recorded;
    /// internal fields are not part of the synchronized state.
    pub fn set_internal(&mut self, name: &str, value: Value) -> DomainResult<()> {
        if !validation::is_internal_field(name) {
            return Err(DomainError::invalid_field_name(name));
        }
        self.account.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Reads an internal field.
    #[must_use]
    pub fn get_internal(&self, name: &str) -> Option<&Value> {
        self.account.fields.get(name)
    }

    /// Returns true if the account has no email (guest account).
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.account.email().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Timestamp;
    use serde_json::json;

    fn handle() -> AccountHandle {
        AccountHandle::new(Account::new())
    }

    #[test]
    fn get_absent_field_reads_null() {
        let h = handle();
        assert_eq!(h.get("missing").unwrap(), Value::Null);
    }

    #[test]
    fn id_is_readable_but_not_writable() {
        let mut h = handle();
        let id = h.get("_id").unwrap();
        assert_eq!(id, json!(h.account().id.0.clone()));

        let err = h.set("_id", json!("other")).unwrap_err();
        assert_eq!(err.code(), 120);
    }

    #[test]
    fn invalid_field_names_are_rejected() {
        let mut h = handle();
        assert!(h.get("no spaces").is_err());
        assert!(h.set("__internal", json!(1)).is_err());
        assert!(h.increment("a-b").is_err());
        assert!(h.append("", json!(1)).is_err());
    }

    #[test]
    fn set_supersedes_history() {
        let mut h = handle();
        h.increment("a").unwrap();
        h.increment_by("a", Number::from(4)).unwrap();
        h.append("b", json!("x")).unwrap();
        h.set("a", json!(9)).unwrap();

        // Exactly one entry remains for `a`, regardless of how many
        // increments preceded the set.
        assert_eq!(h.account().changelog.entries_for_field("a").count(), 1);
        let entry = h.account().changelog.entries_for_field("a").next().unwrap();
        assert_eq!(entry.kind, ChangeKind::Set);
        assert_eq!(entry.value, json!(9));
        // Other fields are untouched.
        assert_eq!(h.account().changelog.entries_for_field("b").count(), 1);
        assert_eq!(h.get("a").unwrap(), json!(9));
    }

    #[test]
    fn increment_from_absent_starts_at_zero() {
        let mut h = handle();
        h.increment_by("score", Number::from(5)).unwrap();
        assert_eq!(h.get("score").unwrap(), json!(5));

        h.decrement_by("score", Number::from(2)).unwrap();
        assert_eq!(h.get("score").unwrap(), json!(3));
        assert_eq!(h.account().changelog.len(), 2);
    }

    #[test]
    fn decrement_records_negated_increment() {
        let mut h = handle();
        h.decrement("score").unwrap();
        let entry = h.account().changelog.iter().next().unwrap();
        assert_eq!(entry.kind, ChangeKind::Increment);
        assert_eq!(entry.value, json!(-1));
        assert_eq!(h.get("score").unwrap(), json!(-1));
    }

    #[test]
    fn increment_non_number_fails() {
        let mut h = handle();
        h.set("name", json!("kara")).unwrap();
        let err = h.increment("name").unwrap_err();
        assert_eq!(err.code(), 121);
        // Value untouched on failure.
        assert_eq!(h.get("name").unwrap(), json!("kara"));
    }

    #[test]
    fn append_builds_sequences() {
        let mut h = handle();
        h.append("tags", json!("a")).unwrap();
        h.append("tags", json!("b")).unwrap();
        assert_eq!(h.get("tags").unwrap(), json!(["a", "b"]));
        assert_eq!(h.account().changelog.len(), 2);
    }

    #[test]
    fn append_to_non_array_fails() {
        let mut h = handle();
        h.set("tags", json!(3)).unwrap();
        assert_eq!(h.append("tags", json!("a")).unwrap_err().code(), 121);
    }

    #[test]
    fn internal_fields_bypass_the_changelog() {
        let mut h = handle();
        h.set_internal("__hashedPassword", json!("h")).unwrap();
        assert_eq!(h.get_internal("__hashedPassword"), Some(&json!("h")));
        assert!(h.account().changelog.is_empty());

        // Non-prefixed names cannot go through the internal path.
        assert!(h.set_internal("email", json!("a@b.com")).is_err());
    }

    #[test]
    fn guest_detection() {
        let mut h = handle();
        assert!(h.is_guest());

        h.account_mut().fields.insert("email".into(), Value::Null);
        assert!(h.is_guest());

        h.set("email", json!("a@b.com")).unwrap();
        assert!(!h.is_guest());
    }

    #[test]
    fn mutations_do_not_touch_updated_at() {
        let mut h = handle();
        let before = h.account().updated_at;
        h.set("a", json!(1)).unwrap();
        h.increment("b").unwrap();
        assert_eq!(h.account().updated_at, before);
        assert!(h.account().updated_at >= Timestamp::from_millis(0));
    }
}
