//! # ely-security
//!
//! Reconciles SSL and authentication configuration of an application
//! server with what the operator asked for.
//!
//! Builders read the resource store, reuse equivalent resources and stage
//! what is missing in a [`ReconciliationPlan`], which is applied as a single
//! atomic composite.
//!
//! ## Features
//!
//! - SSL context chains from a named key store, a key store file or a newly
//!   generated key pair, with compensation of out-of-composite work
//! - HTTP and SASL authentication factories, mechanism removal and SASL
//!   mechanism reordering with last-mechanism protection
//! - Binding to management interfaces, HTTPS listeners and application
//!   security domains
//! - Security reports of management interfaces and HTTP servers
//!
//! ## Example
//!
//! ```ignore
//! use ely_security::{service, KeyStoreSource, SslBindingOptions, SslEndpoint, SslSecurityBuilder};
//!
//! let endpoint = SslEndpoint::management(None);
//! let builder = SslSecurityBuilder::new(KeyStoreSource::Named("server-ks".into()));
//! let outcome = service::plan_enable_ssl(&store, &endpoint, &builder, &SslBindingOptions::default(), None).await?;
//! outcome.apply(&store, false).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod elytron;
pub mod endpoint;
pub mod error;
pub mod info;
pub mod keystore;
pub mod matcher;
pub mod naming;
pub mod plan;
pub mod service;
pub mod ssl;

pub use auth::{AuthOutcome, AuthSecurityBuilder};
pub use client::ReloadStatus;
pub use endpoint::{AuthEndpoint, SslBindingOptions, SslEndpoint};
pub use error::{SecurityError, SecurityResult};
pub use info::{AuthInfo, HttpServerInfo, ManagementInfo, SslInfo};
pub use keystore::{GeneratedKeyStore, KeyStorePath, KeyStoreSource, Prompter, ScriptedPrompter};
pub use matcher::{MatchPolicy, ResourceMatcher};
pub use plan::ReconciliationPlan;
pub use service::{MechanismOptions, NewResourceNames};
pub use ssl::{Compensation, SslOutcome, SslSecurityBuilder};
