//! In-memory storage adapter.

use crate::error::{StoreError, StoreResult};
use crate::store::{SaveMode, UserStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use usersync_core::{Account, AccountId, Session, SessionId, Timestamp};

/// Default session lifetime: roughly ten years, in milliseconds.
///
/// Sessions are destroyed on logout; the expiry is bookkeeping, not an
/// enforced deadline.
const DEFAULT_SESSION_TTL_MILLIS: i64 = 10 * 365 * 24 * 60 * 60 * 1000;

/// An in-memory storage adapter.
///
/// Stores accounts and sessions in process memory. Suitable for:
/// - Unit and integration tests
/// - Ephemeral deployments that don't need persistence
///
/// # Thread safety
///
/// The store is thread-safe and is shared across request handlers behind
/// an `Arc`.
#[derive(Debug)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
    sessions: RwLock<HashMap<SessionId, Session>>,
    session_ttl_millis: i64,
}

impl MemoryStore {
    /// Creates an empty store with the default session lifetime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_session_ttl(DEFAULT_SESSION_TTL_MILLIS)
    }

    /// Creates an empty store with a custom session lifetime.
    #[must_use]
    pub fn with_session_ttl(session_ttl_millis: i64) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            session_ttl_millis,
        }
    }

    /// Returns the number of stored accounts.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    /// Returns the number of stored sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Removes an account outright, leaving any sessions dangling.
    ///
    /// Accounts are never deleted through the adapter contract; this
    /// exists so tests can produce the dangling-session condition.
    pub fn remove_account(&self, id: &AccountId) -> bool {
        self.accounts.write().remove(id).is_some()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore for MemoryStore {
    fn load_account(&self, id: &AccountId) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().get(id).cloned())
    }

    fn save_account(&self, mut account: Account, mode: SaveMode) -> StoreResult<Account> {
        let mut accounts = self.accounts.write();
        let exists = accounts.contains_key(&account.id);
        match mode {
            SaveMode::CreateOnly if exists => {
                return Err(StoreError::AccountAlreadyExists(account.id));
            }
            SaveMode::UpdateOnly if !exists => {
                return Err(StoreError::AccountNotFound(account.id));
            }
            _ => {}
        }

        account.updated_at = Timestamp::now();
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|a| a.email() == Some(email))
            .cloned())
    }

    fn load_session(&self, id: &SessionId) -> StoreResult<Option<Session>> {
        Ok(self.sessions.read().get(id).cloned())
    }

    fn create_session(&self, account_id: &AccountId) -> StoreResult<Session> {
        let now = Timestamp::now();
        let session = Session {
            id: SessionId::fresh(),
            account_id: account_id.clone(),
            created_at: now,
            expires_at: now.saturating_add_millis(self.session_ttl_millis),
        };
        self.sessions
            .write()
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn delete_session(&self, id: &SessionId) -> StoreResult<bool> {
        Ok(self.sessions.write().remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account_with_email(email: &str) -> Account {
        let mut account = Account::new();
        account.fields.insert("email".into(), json!(email));
        account
    }

    #[test]
    fn create_then_load() {
        let store = MemoryStore::new();
        let account = Account::new();
        let id = account.id.clone();

        store.save_account(account, SaveMode::CreateOnly).unwrap();
        assert!(store.load_account(&id).unwrap().is_some());
        assert_eq!(store.account_count(), 1);
    }

    #[test]
    fn create_only_rejects_existing_id() {
        let store = MemoryStore::new();
        let account = Account::new();

        store
            .save_account(account.clone(), SaveMode::CreateOnly)
            .unwrap();
        let err = store
            .save_account(account, SaveMode::CreateOnly)
            .unwrap_err();
        assert!(matches!(err, StoreError::AccountAlreadyExists(_)));
    }

    #[test]
    fn update_only_rejects_missing_id() {
        let store = MemoryStore::new();
        let err = store
            .save_account(Account::new(), SaveMode::UpdateOnly)
            .unwrap_err();
        assert!(matches!(err, StoreError::AccountNotFound(_)));
    }

    #[test]
    fn save_stamps_updated_at() {
        let store = MemoryStore::new();
        let mut account = Account::new();
        account.updated_at = Timestamp::from_millis(0);

        let saved = store.save_account(account, SaveMode::CreateOnly).unwrap();
        assert!(saved.updated_at > Timestamp::from_millis(0));
    }

    #[test]
    fn find_by_email() {
        let store = MemoryStore::new();
        store
            .save_account(account_with_email("a@b.com"), SaveMode::CreateOnly)
            .unwrap();
        store
            .save_account(Account::new(), SaveMode::CreateOnly)
            .unwrap();

        let found = store.find_account_by_email("a@b.com").unwrap().unwrap();
        assert_eq!(found.email(), Some("a@b.com"));
        assert!(store.find_account_by_email("x@y.com").unwrap().is_none());
    }

    #[test]
    fn session_lifecycle() {
        let store = MemoryStore::new();
        let account = store
            .save_account(Account::new(), SaveMode::CreateOnly)
            .unwrap();

        let session = store.create_session(&account.id).unwrap();
        assert_eq!(session.account_id, account.id);
        assert!(session.expires_at > session.created_at);

        let loaded = store.load_session(&session.id).unwrap().unwrap();
        assert_eq!(loaded, session);

        assert!(store.delete_session(&session.id).unwrap());
        assert!(!store.delete_session(&session.id).unwrap());
        assert!(store.load_session(&session.id).unwrap().is_none());
    }

    #[test]
    fn remove_account_leaves_sessions_dangling() {
        let store = MemoryStore::new();
        let account = store
            .save_account(Account::new(), SaveMode::CreateOnly)
            .unwrap();
        let session = store.create_session(&account.id).unwrap();

        assert!(store.remove_account(&account.id));
        assert!(store.load_account(&account.id).unwrap().is_none());
        assert!(store.load_session(&session.id).unwrap().is_some());
    }
}
