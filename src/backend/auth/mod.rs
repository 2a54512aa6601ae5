//! Authentication Module
//!
//! Resolves the credential presented on the WebSocket upgrade to the
//! identity the chat session runs as. Token issuance is handled by a
//! separate service; this relay only verifies.
//!
//! - **`identity`** - JWT claims, `IdentityResolver` and its JWT implementation

pub mod identity;

pub use identity::{
    AuthError, Claims, IdentityResolver, JwtIdentityResolver, ResolvedIdentity,
    SharedIdentityResolver,
};
