//! The session gate.
//!
//! Every authenticated request passes through here:
//! session lookup, per-account lock acquisition, account lookup, handler
//! invocation, lock release. The handler is either a server-side function
//! or the sync engine; both persist before returning, so the lock covers
//! compute plus persist.

use crate::error::ServerResult;
use crate::locks::LockRegistry;
use std::sync::Arc;
use tracing::{debug, warn};
use usersync_core::{AccountHandle, DomainError, Session, SessionId};
use usersync_storage::UserStore;

/// Resolves a session id to an account under mutual exclusion.
pub struct SessionGate {
    store: Arc<dyn UserStore>,
    locks: LockRegistry,
}

impl SessionGate {
    /// Creates a gate over the given store.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            locks: LockRegistry::new(),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Runs `handler` with the session's account, holding the account's
    /// lock for the duration.
    ///
    /// Fails with [`DomainError::SessionNotFound`] when the session does
    /// not exist, or when its account is gone (the session was issued and
    /// the account deleted afterwards); a dangling session is deleted as
    /// a side effect. The lock is released on every exit path, success or
    /// failure.
    pub fn run<T>(
        &self,
        session_id: &SessionId,
        handler: impl FnOnce(&Session, &mut AccountHandle) -> ServerResult<T>,
    ) -> ServerResult<T> {
        let session = self
            .store
            .load_session(session_id)?
            .ok_or(DomainError::SessionNotFound)?;

        let _guard = self.locks.lock(&session.account_id);
        debug!(account = %session.account_id, "account lock acquired");

        let Some(account) = self.store.load_account(&session.account_id)? else {
            // The account was deleted after the session was issued. Delete
            // the session and pretend it never existed.
            warn!(account = %session.account_id, "dangling session, deleting");
            self.store.delete_session(session_id)?;
            return Err(DomainError::SessionNotFound.into());
        };

        let mut handle = AccountHandle::new(account);
        handler(&session, &mut handle)
        // _guard drops here, releasing the account lock.
    }
}
