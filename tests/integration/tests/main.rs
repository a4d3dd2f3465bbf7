//! End-to-End Integration Tests
//!
//! These tests drive the security commands against an in-memory server
//! seeded with what a fresh standalone installation ships with.

mod common;
mod auth_flows;
mod reports;
mod ssl_flows;
