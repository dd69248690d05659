//! Per-account lock registry.

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use std::collections::HashMap;
use std::sync::Arc;
use usersync_core::AccountId;

/// Process-wide map from account id to a binary lock.
///
/// Entries are created lazily under a single map-level mutex, so entry
/// creation itself cannot race, and are kept for the lifetime of the
/// process. Memory therefore grows with the number of distinct accounts
/// ever touched; that is bounded by the backing store's account count.
///
/// Holding a guard from [`LockRegistry::lock`] makes every authenticated
/// operation against one account linearizable with respect to every other
/// authenticated operation against that same account. Each request holds
/// at most one lock and locks are never nested, so no deadlock is
/// possible.
#[derive(Debug, Default)]
pub struct LockRegistry {
    entries: Mutex<HashMap<AccountId, Arc<Mutex<()>>>>,
}

/// Guard for one account's lock.
///
/// The lock is released when the guard drops, on every exit path
/// including panics in the guarded handler. There is no timeout: a guard
/// that is never dropped starves all future operations on that account.
#[must_use = "the account lock is held only while the guard is alive"]
pub struct AccountLockGuard {
    _guard: ArcMutexGuard<RawMutex, ()>,
}

impl LockRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for an account, blocking until it is available.
    pub fn lock(&self, account_id: &AccountId) -> AccountLockGuard {
        let entry = {
            let mut entries = self.entries.lock();
            Arc::clone(entries.entry(account_id.clone()).or_default())
        };
        // The map lock is released before blocking on the per-account
        // lock; other accounts are never held up by a slow handler.
        AccountLockGuard {
            _guard: entry.lock_arc(),
        }
    }

    /// Returns the number of accounts ever locked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no account has been locked yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
