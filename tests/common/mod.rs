//! Common test utilities and helpers
//!
//! - Token minting for the test secret
//! - A relay server on an ephemeral port
//! - PostgreSQL fixtures, when a test database is configured
//! - WebSocket client helpers

#![allow(dead_code)]

pub mod auth_helpers;
pub mod database;
pub mod relay_server;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use database::*;
pub use relay_server::*;
