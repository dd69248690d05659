//! The sync server: account lifecycle plus synchronization.

use crate::auth::{CredentialHasher, Sha256Hasher};
use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::gate::SessionGate;
use crate::protocol::{AuthOutcome, SyncOutcome};
use crate::sync;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use usersync_core::{
    validation, Account, AccountHandle, Change, DomainError, Session, SessionId,
};
use usersync_storage::{SaveMode, UserStore};

/// Internal field holding the hashed credential.
const HASHED_PASSWORD_FIELD: &str = "__hashedPassword";

/// The user-synchronization server.
///
/// Wraps a storage adapter with the session gate, the sync engine, and
/// the unauthenticated account lifecycle operations. One instance is
/// shared across all request handlers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use usersync_server::{ServerConfig, SyncServer};
/// use usersync_storage::MemoryStore;
///
/// let server = SyncServer::new(Arc::new(MemoryStore::new()), ServerConfig::default());
/// let guest = server.log_in_as_guest().unwrap();
/// let sync = server.synchronize_user(&guest.session_id, vec![]).unwrap();
/// assert!(sync.processed_changes.is_empty());
/// ```
pub struct SyncServer {
    store: Arc<dyn UserStore>,
    gate: SessionGate,
    hasher: Arc<dyn CredentialHasher>,
    config: ServerConfig,
}

impl SyncServer {
    /// Creates a server over the given store.
    pub fn new(store: Arc<dyn UserStore>, config: ServerConfig) -> Self {
        let gate = SessionGate::new(Arc::clone(&store));
        Self {
            store,
            gate,
            hasher: Arc::new(Sha256Hasher),
            config,
        }
    }

    /// Replaces the credential hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn CredentialHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Runs a server-side function against the session's account, under
    /// the account's lock.
    ///
    /// This is the seam user-supplied functions are invoked through; the
    /// function persists via the store if it mutates the account.
    pub fn with_session<T>(
        &self,
        session_id: &SessionId,
        handler: impl FnOnce(&Session, &mut AccountHandle) -> ServerResult<T>,
    ) -> ServerResult<T> {
        self.gate.run(session_id, handler)
    }

    /// A fresh account record: email (possibly null), hashed credential
    /// (possibly null), empty change log.
    fn fresh_account(email: Option<&str>, hashed_password: Option<String>) -> Account {
        let mut account = Account::new();
        account.fields.insert(
            "email".into(),
            email.map_or(Value::Null, |e| Value::String(e.to_string())),
        );
        account.fields.insert(
            HASHED_PASSWORD_FIELD.into(),
            hashed_password.map_or(Value::Null, Value::String),
        );
        account
    }

    /// Creates a guest account (no email, no credential) and a session
    /// for it.
    pub fn log_in_as_guest(&self) -> ServerResult<AuthOutcome> {
        let account = self
            .store
            .save_account(Self::fresh_account(None, None), SaveMode::CreateOnly)?;
        let session = self.store.create_session(&account.id)?;
        info!(account = %account.id, "guest logged in");

        Ok(AuthOutcome {
            session_id: session.id,
            user_data: account.stripped_data(),
        })
    }

    /// Creates an account with the given credentials and a session for it.
    pub fn sign_up(&self, email: &str, password: &str) -> ServerResult<AuthOutcome> {
        if !validation::is_valid_email(email) {
            return Err(DomainError::InvalidEmailAddress.into());
        }
        if !(self.config.password_policy)(password) {
            return Err(DomainError::InvalidPassword.into());
        }
        if self.store.find_account_by_email(email)?.is_some() {
            return Err(DomainError::UserAlreadyExists.into());
        }

        let hashed = self.hasher.hash(password);
        let account = self.store.save_account(
            Self::fresh_account(Some(email), Some(hashed)),
            SaveMode::CreateOnly,
        )?;
        let session = self.store.create_session(&account.id)?;
        info!(account = %account.id, "user signed up");

        Ok(AuthOutcome {
            session_id: session.id,
            user_data: account.stripped_data(),
        })
    }

    /// Verifies the credentials and creates a session.
    pub fn log_in(&self, email: &str, password: &str) -> ServerResult<AuthOutcome> {
        let Some(account) = self.store.find_account_by_email(email)? else {
            return Err(DomainError::NoUserWithGivenEmail.into());
        };

        let stored_hash = account
            .fields
            .get(HASHED_PASSWORD_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !self.hasher.verify(password, stored_hash) {
            return Err(DomainError::IncorrectPassword.into());
        }

        let session = self.store.create_session(&account.id)?;
        info!(account = %account.id, "user logged in");

        Ok(AuthOutcome {
            session_id: session.id,
            user_data: account.stripped_data(),
        })
    }

    /// Gives a guest account an email and credential, in place.
    ///
    /// Only valid while the account has no email set.
    pub fn convert_guest_user(
        &self,
        session_id: &SessionId,
        email: &str,
        password: &str,
    ) -> ServerResult<Map<String, Value>> {
        if !validation::is_valid_email(email) {
            return Err(DomainError::InvalidEmailAddress.into());
        }
        if !(self.config.password_policy)(password) {
            return Err(DomainError::InvalidPassword.into());
        }

        self.gate.run(session_id, |_, handle| {
            if !handle.is_guest() {
                return Err(DomainError::CanNotConvertNonGuestUser.into());
            }

            handle.set("email", Value::String(email.to_string()))?;
            handle.set_internal(
                HASHED_PASSWORD_FIELD,
                Value::String(self.hasher.hash(password)),
            )?;

            let saved = self
                .store
                .save_account(handle.account().clone(), SaveMode::UpdateOnly)?;
            info!(account = %saved.id, "guest converted");
            Ok(saved.stripped_data())
        })
    }

    /// Destroys the session.
    pub fn log_out(&self, session_id: &SessionId) -> ServerResult<()> {
        self.gate.run(session_id, |session, _| {
            if !self.store.delete_session(&session.id)? {
                return Err(DomainError::LogoutFailed.into());
            }
            info!(account = %session.account_id, "logged out");
            Ok(())
        })
    }

    /// Merges a client change log into the session's account and
    /// persists the result.
    pub fn synchronize_user(
        &self,
        session_id: &SessionId,
        client_changelog: Vec<Change>,
    ) -> ServerResult<SyncOutcome> {
        self.gate.run(session_id, |_, handle| {
            let processed_changes = sync::merge(handle.account_mut(), client_changelog)?;
            let saved = self
                .store
                .save_account(handle.account().clone(), SaveMode::UpdateOnly)?;

            Ok(SyncOutcome {
                user_data: saved.stripped_data(),
                processed_changes,
            })
        })
    }
}
