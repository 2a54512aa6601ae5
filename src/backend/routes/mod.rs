//! Route Configuration Module
//!
//! HTTP routes of the relay.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs     - Module exports and documentation
//! ├── router.rs  - Main router creation
//! └── health.rs  - GET /health
//! ```
//!
//! The chat upgrade handler itself lives in `backend::realtime::socket`.

/// Main router creation
pub mod router;

/// Health endpoint
pub mod health;

// Re-export commonly used functions
pub use router::create_router;
