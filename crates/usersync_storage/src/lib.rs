//! # usersync Storage
//!
//! Storage adapter trait and implementations for the usersync backend.
//!
//! Adapters provide durable get/put of accounts and sessions keyed by
//! opaque id, with optimistic create-vs-update semantics. They interpret
//! nothing beyond that: no query language, no schema validation.
//!
//! ## Available adapters
//!
//! - [`MemoryStore`] - For tests and ephemeral deployments

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{SaveMode, UserStore};
