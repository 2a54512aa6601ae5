//! Server Module
//!
//! Configuration, shared state and startup for the relay's Axum server.
//!
//! # Architecture
//!
//! - **`config`** - Environment configuration and database loading
//! - **`state`** - `AppState` and `FromRef` implementations
//! - **`init`** - Store selection, app creation, tracing and shutdown
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs     - Module exports and documentation
//! ├── config.rs  - RelayConfig, ConfigError, load_database
//! ├── state.rs   - AppState and FromRef implementations
//! └── init.rs    - Server initialization and app creation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use capsule_relay::backend::server::{create_app, RelayConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::from_env()?;
//! let app = create_app(&config).await;
//! # Ok(())
//! # }
//! ```

/// Server configuration loading
pub mod config;

/// Application state management
pub mod state;

/// Server initialization
pub mod init;

// Re-export commonly used types
pub use config::{ConfigError, RelayConfig};
pub use init::{create_app, create_app_with_store};
pub use state::AppState;
