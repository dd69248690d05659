//! Error types for storage adapters.

use thiserror::Error;
use usersync_core::AccountId;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a storage adapter.
///
/// These are unexpected errors from the domain's point of view: the wire
/// boundary never surfaces them verbatim outside debug mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A create-only save found an existing account with the same id.
    #[error("account already exists: {0}")]
    AccountAlreadyExists(AccountId),

    /// An update-only save found no account with the given id.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Adapter-specific failure (connection loss, corrupt document, ...).
    #[error("storage backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
