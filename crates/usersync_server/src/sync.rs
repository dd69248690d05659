//! The sync engine.
//!
//! Merges a client-submitted change log into the server's authoritative
//! copy. Per field this is a last-writer-wins register for `set` composed
//! with commutative accumulation for `increment`/`append`, where "last"
//! is the wall-clock timestamp carried in the change, not arrival order.
//! That makes the merge resilient to network reordering and to clients
//! that were offline for an arbitrary period.

use serde_json::Value;
use tracing::{debug, trace};
use usersync_core::{
    add_numbers, Account, Change, ChangeId, ChangeKind, DomainError, DomainResult,
};

/// Merges `client_changelog` into the account's fields and change log.
///
/// Client changes are processed in ascending timestamp order against the
/// server log as it mutates, so later client changes see the effects of
/// earlier ones. A client change is dropped entirely when the server log
/// already holds a `set` for the same field with a strictly greater
/// timestamp. Afterwards the server log is re-sorted by timestamp.
///
/// Returns the ids of the consumed client changes (all of them, by
/// construction) so the client can prune its pending buffer. Change ids
/// are not deduplicated across calls: resubmitting an already-merged log
/// re-applies its `increment`/`append` effects.
pub fn merge(account: &mut Account, client_changelog: Vec<Change>) -> DomainResult<Vec<ChangeId>> {
    let mut client_changelog = client_changelog;
    client_changelog.sort_by_key(|c| c.date);
    let processed: Vec<ChangeId> = client_changelog.iter().map(|c| c.id.clone()).collect();

    for change in client_changelog {
        if account.changelog.has_newer_set(&change.field, change.date) {
            trace!(field = %change.field, date = %change.date, "superseded by newer set, dropped");
            continue;
        }

        match change.kind {
            ChangeKind::Set => apply_set(account, change)?,
            ChangeKind::Increment => apply_increment(account, change)?,
            ChangeKind::Append => apply_append(account, change)?,
        }
    }

    // The loop appends in processing order; restore timestamp order.
    account.changelog.sort_by_date();
    debug!(
        account = %account.id,
        consumed = processed.len(),
        log_len = account.changelog.len(),
        "client changelog merged"
    );
    Ok(processed)
}

/// Applies a client `set`: prune the field's history up to the set's
/// timestamp, install the value, then replay the strictly-later local
/// `increment`/`append` entries on top of it.
fn apply_set(account: &mut Account, change: Change) -> DomainResult<()> {
    account
        .changelog
        .retain(|c| c.field != change.field || c.date > change.date);

    let later: Vec<Change> = account
        .changelog
        .entries_for_field(&change.field)
        .cloned()
        .collect();

    let mut value = change.value.clone();
    for entry in later {
        match entry.kind {
            ChangeKind::Increment => {
                value = add_numbers(&value, &entry.value).ok_or_else(|| {
                    DomainError::invalid_change_type(format!(
                        "cannot replay increment on non-number field {}",
                        change.field
                    ))
                })?;
            }
            ChangeKind::Append => match &mut value {
                Value::Array(items) => items.push(entry.value),
                _ => {
                    return Err(DomainError::invalid_change_type(format!(
                        "cannot replay append on non-array field {}",
                        change.field
                    )))
                }
            },
            // Any later set would have suppressed this change outright.
            ChangeKind::Set => {
                return Err(DomainError::invalid_change_type(format!(
                    "set entry survived supersession pruning for field {}",
                    change.field
                )))
            }
        }
    }

    account.fields.insert(change.field.clone(), value);
    account.changelog.push(change);
    Ok(())
}

/// Applies a client `increment`; an absent field counts from 0.
fn apply_increment(account: &mut Account, change: Change) -> DomainResult<()> {
    let current = account
        .fields
        .entry(change.field.clone())
        .or_insert_with(|| Value::from(0));
    *current = add_numbers(current, &change.value).ok_or_else(|| {
        DomainError::invalid_change_type(format!(
            "cannot increment non-number field {}",
            change.field
        ))
    })?;
    account.changelog.push(change);
    Ok(())
}

/// Applies a client `append`; an absent field counts as an empty sequence.
fn apply_append(account: &mut Account, change: Change) -> DomainResult<()> {
    let current = account
        .fields
        .entry(change.field.clone())
        .or_insert_with(|| Value::Array(Vec::new()));
    match current {
        Value::Array(items) => items.push(change.value.clone()),
        _ => {
            return Err(DomainError::invalid_change_type(format!(
                "cannot append to non-array field {}",
                change.field
            )))
        }
    }
    account.changelog.push(change);
    Ok(())
}
