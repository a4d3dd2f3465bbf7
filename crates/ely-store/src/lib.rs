//! # ely-store
//!
//! Resource store clients for the ely security tooling.
//!
//! ## Stores
//!
//! - [`HttpStore`] - posts operations to a server's HTTP management endpoint
//! - [`MemoryStore`] - in-process tree with atomic composites and fault
//!   injection

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod http;
pub mod memory;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use http::{HttpStore, HttpStoreConfig};
pub use memory::{Fault, MemoryStore};
pub use store::ResourceStore;
