//! # usersync Core
//!
//! Data model for the usersync backend.
//!
//! This crate provides:
//! - The change log model (field mutations with kind, timestamp, and id)
//! - The account and session records
//! - The account handle (get/set/increment/append with field validation)
//! - The domain error taxonomy with stable numeric codes
//!
//! Everything here is pure data plus invariants; no I/O happens in this
//! crate. Storage and request handling live in `usersync_storage` and
//! `usersync_server`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod account;
mod change;
mod error;
mod handle;
mod session;
mod types;
mod value;

pub mod validation;

pub use account::Account;
pub use change::{Change, ChangeKind, ChangeLog};
pub use error::{DomainError, DomainResult};
pub use handle::AccountHandle;
pub use session::Session;
pub use types::{AccountId, ChangeId, SessionId, Timestamp};
pub use value::{add_numbers, negate_number};
