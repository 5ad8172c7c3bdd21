// ABOUTME: Library root for wharf - exposes the deploy engine for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod branch;
pub mod builders;
pub mod checkout;
pub mod config;
pub mod deploy;
pub mod error;
pub mod exec;
pub mod host;
pub mod keys;
pub mod layout;
pub mod output;
pub mod push;
pub mod repo;
pub mod routing;
pub mod runner;
pub mod store;
pub mod types;
