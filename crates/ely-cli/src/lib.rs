//! # ely-cli
//!
//! Command-line tool securing the management interfaces and web servers of
//! an application server.
//!
//! ## Commands
//!
//! - `ely security enable-ssl-management` / `disable-ssl-management`
//! - `ely security enable-ssl-http-server` / `disable-ssl-http-server`
//! - `ely security enable-http-auth-management` / `disable-http-auth-management`
//! - `ely security enable-http-auth-http-server` / `disable-http-auth-http-server`
//! - `ely security enable-sasl-management` / `disable-sasl-management`
//! - `ely security reorder-sasl-management`
//! - `ely security info-management` / `info-http-server`
//! - `ely config show` / `set`
//!
//! ## Example
//!
//! ```bash
//! ely security enable-ssl-management --key-store-path server.p12 --key-store-password secret
//! ely --print-request security enable-http-auth-management --mechanism BASIC \
//!     --user-properties-file users.properties --user-properties-realm-name ManagementRealm
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
