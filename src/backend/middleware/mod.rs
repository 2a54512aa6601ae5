//! Middleware Module
//!
//! Request processing that runs before the chat upgrade handler.
//!
//! # Architecture
//!
//! - **`auth`** - Credential extraction and identity resolution
//! - **`origin`** - Browser origin allow-list
//!
//! # Example
//!
//! ```rust,no_run
//! use capsule_relay::backend::middleware::auth_middleware;
//!
//! // let protected = route.route_layer(axum::middleware::from_fn_with_state(state, auth_middleware));
//! ```

pub mod auth;
pub mod origin;

pub use auth::{auth_middleware, extract_credential, AuthUser, AuthenticatedUser};
pub use origin::origin_allowed;
