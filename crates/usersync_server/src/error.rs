//! Error types for the server.

use thiserror::Error;
use usersync_core::DomainError;
use usersync_storage::StoreError;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling a request.
///
/// Domain errors propagate unmodified from the point of detection to the
/// request boundary and surface with their stable code and message.
/// Everything else collapses to the generic internal code at the wire,
/// with detail available only in debug mode.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A domain error from the closed, numbered set.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A storage adapter failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// An unexpected server-side failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Wire code for errors outside the domain set.
pub const INTERNAL_ERROR_CODE: i32 = -1;

impl ServerError {
    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this error is safe to surface verbatim.
    #[must_use]
    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }

    /// Returns the wire error code.
    #[must_use]
    pub fn wire_code(&self) -> i32 {
        match self {
            Self::Domain(err) => err.code(),
            _ => INTERNAL_ERROR_CODE,
        }
    }

    /// Returns the wire error message.
    ///
    /// Unexpected errors only reveal detail when `debug` is set.
    #[must_use]
    pub fn wire_message(&self, debug: bool) -> String {
        match self {
            Self::Domain(err) => err.to_string(),
            _ if debug => self.to_string(),
            _ => "Internal error".to_string(),
        }
    }
}
