//! # usersync Server
//!
//! Session-gated user synchronization server.
//!
//! This crate provides:
//! - The session gate: session-to-account resolution under a per-account
//!   lock
//! - The sync engine: merging a client-submitted change log into the
//!   server's authoritative copy
//! - Unauthenticated account lifecycle operations (guest login, sign up,
//!   log in, guest conversion, log out)
//! - The wire envelope and endpoint dispatch
//!
//! # Concurrency
//!
//! For a fixed account id, all authenticated operations execute in mutual
//! exclusion: the lock registry entry is acquired before loading the
//! account and released after the result has been computed and persisted.
//! Operations on different accounts never contend. There is intentionally
//! no lock timeout; a handler that never returns starves its account.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use usersync_server::{ServerConfig, SyncServer};
//! use usersync_storage::MemoryStore;
//!
//! let server = SyncServer::new(Arc::new(MemoryStore::new()), ServerConfig::default());
//! let outcome = server.log_in_as_guest().unwrap();
//! assert!(outcome.user_data.contains_key("_id"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod gate;
mod locks;
mod protocol;
mod server;
mod sync;

pub use auth::{CredentialHasher, Sha256Hasher};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult, INTERNAL_ERROR_CODE};
pub use gate::SessionGate;
pub use locks::{AccountLockGuard, LockRegistry};
pub use protocol::{AuthOutcome, SyncOutcome};
pub use server::SyncServer;
pub use sync::merge;
