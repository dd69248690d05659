//! Domain error taxonomy.
//!
//! Domain errors form a closed, numbered set and are always safe to
//! surface verbatim to the caller with their stable code and message.
//! Anything outside this set (storage failures, programming errors) is an
//! unexpected error and collapses to a generic internal code at the wire
//! boundary.

use thiserror::Error;

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors that are part of the public contract.
///
/// Codes are stable and must never be renumbered.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// An account with the given email already exists.
    #[error("User already exists")]
    UserAlreadyExists,

    /// The email address is not structurally valid.
    #[error("Invalid email address")]
    InvalidEmailAddress,

    /// The password does not satisfy the configured policy.
    #[error("Invalid password")]
    InvalidPassword,

    /// No session with the given id exists (or its account is gone).
    #[error("Session not found")]
    SessionNotFound,

    /// The account already has an email and cannot be converted.
    #[error("Can not convert non guest user")]
    CanNotConvertNonGuestUser,

    /// No account is registered under the given email.
    #[error("No user with given email address")]
    NoUserWithGivenEmail,

    /// The password does not match the stored credential.
    #[error("Incorrect password")]
    IncorrectPassword,

    /// Session deletion reported failure.
    #[error("Logout failed")]
    LogoutFailed,

    /// An authenticated endpoint was called without a session id.
    #[error("Not logged in")]
    NotLoggedIn,

    /// A field name failed validation or is reserved.
    #[error("Invalid field name ({field})")]
    InvalidFieldName {
        /// The offending field name.
        field: String,
    },

    /// A change cannot be applied to the field's current value, or its
    /// kind could not be recognized.
    #[error("Invalid change type ({detail})")]
    InvalidChangeType {
        /// Description of the mismatch.
        detail: String,
    },
}

impl DomainError {
    /// Returns the stable numeric code for this error.
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::UserAlreadyExists => 100,
            Self::InvalidEmailAddress => 101,
            Self::InvalidPassword => 102,
            Self::SessionNotFound => 103,
            Self::CanNotConvertNonGuestUser => 104,
            Self::NoUserWithGivenEmail => 106,
            Self::IncorrectPassword => 107,
            Self::LogoutFailed => 108,
            Self::NotLoggedIn => 119,
            Self::InvalidFieldName { .. } => 120,
            Self::InvalidChangeType { .. } => 121,
        }
    }

    /// Creates an invalid field name error.
    pub fn invalid_field_name(field: impl Into<String>) -> Self {
        Self::InvalidFieldName {
            field: field.into(),
        }
    }

    /// Creates an invalid change type error.
    pub fn invalid_change_type(detail: impl Into<String>) -> Self {
        Self::InvalidChangeType {
            detail: detail.into(),
        }
    }
}
