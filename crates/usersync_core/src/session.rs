//! Session records.

use crate::types::{AccountId, SessionId, Timestamp};
use serde::{Deserialize, Serialize};

/// A short-lived credential binding a request to an account.
///
/// Sessions are created on login/signup, destroyed on logout, and never
/// otherwise mutated. They are owned exclusively by the storage adapter;
/// the session gate only reads and deletes them. The expiry is recorded
/// but not currently enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session id, carried by clients as `sessionId`.
    #[serde(rename = "_id")]
    pub id: SessionId,
    /// The account this session authenticates.
    #[serde(rename = "userId")]
    pub account_id: AccountId,
    /// Creation time.
    #[serde(rename = "createdAt")]
    pub created_at: Timestamp,
    /// Expiry time.
    #[serde(rename = "expiresAt")]
    pub expires_at: Timestamp,
}
