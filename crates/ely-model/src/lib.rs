//! # ely-model
//!
//! Management model types for the ely security tooling.
//!
//! This crate provides:
//! - Resource addresses and security resource types
//! - Operations and responses in their wire form
//! - Descriptors of key stores, key managers, SSL contexts, realms,
//!   security domains, authentication factories and mechanisms

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod address;
pub mod entities;
pub mod error;
pub mod mechanism;
pub mod operation;
pub mod resource;
pub mod response;

pub use address::Address;
pub use entities::{
    AuthFactory, AuthFactorySpec, KeyManager, KeyStore, Realm, SecurityDomain, ServerSslContext,
};
pub use error::ModelError;
pub use mechanism::{
    AuthMechanism, FileSystemRealmConfig, GenericRealmConfig, LocalUserConfig, MechanismConfig,
    MechanismKind, PropertiesRealmConfig, TrustStoreConfig,
};
pub use operation::{op, Operation};
pub use resource::{attr, ResourceType};
pub use response::{Outcome, Response};
