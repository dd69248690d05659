//! The storage adapter trait.

use crate::error::StoreResult;
use usersync_core::{Account, AccountId, Session, SessionId};

/// How a save treats an existing document with the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// The account must not exist yet; saving over an existing id fails.
    CreateOnly,
    /// The account must already exist; saving a missing id fails.
    ///
    /// Synchronization saves always use this mode.
    UpdateOnly,
}

/// Durable get/put of accounts and sessions, keyed by opaque id.
///
/// Implementations must be `Send + Sync`; the server shares one adapter
/// across all request handlers. The adapter owns session records
/// exclusively: the session gate only reads and deletes them.
pub trait UserStore: Send + Sync {
    /// Loads an account by id. `None` if absent.
    fn load_account(&self, id: &AccountId) -> StoreResult<Option<Account>>;

    /// Persists an account and returns the stored copy.
    ///
    /// Stamps `updated_at`; the account handle never does.
    fn save_account(&self, account: Account, mode: SaveMode) -> StoreResult<Account>;

    /// Finds the account whose `email` field equals `email`. `None` if
    /// absent.
    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Loads a session by id. `None` if absent.
    fn load_session(&self, id: &SessionId) -> StoreResult<Option<Session>>;

    /// Creates and persists a new session for the account.
    fn create_session(&self, account_id: &AccountId) -> StoreResult<Session>;

    /// Deletes a session. Returns false if nothing was deleted.
    fn delete_session(&self, id: &SessionId) -> StoreResult<bool>;
}
