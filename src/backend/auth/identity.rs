/**
 * Identity Resolution
 *
 * Turns a bearer credential into the identity a chat session runs as.
 * Tokens are issued elsewhere; this module only verifies them.
 *
 * # Token Format
 *
 * HS256 JWT signed with `JWT_SECRET`, carrying:
 *
 * ```json
 * {"user_id": "u1", "email": "a@b.c", "role": "user", "exp": 1700000000, "iat": 1690000000}
 * ```
 *
 * An empty or missing `role` is read as `user`.
 */

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::shared::messaging::Identity;

/// Role assumed when a token carries none
pub const DEFAULT_ROLE: &str = "user";

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user identifier; becomes the session identity
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
}

/// The caller a credential resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: Identity,
    pub email: String,
    pub role: String,
}

impl From<Claims> for ResolvedIdentity {
    fn from(claims: Claims) -> Self {
        let role = if claims.role.is_empty() {
            DEFAULT_ROLE.to_string()
        } else {
            claims.role
        };
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role,
        }
    }
}

/// Identity resolution failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer header and no `token` query parameter
    #[error("missing credentials")]
    MissingCredentials,

    /// Signature, expiry or shape check failed
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token verified but names no user
    #[error("token has no user id")]
    MissingUserId,
}

/// Resolves a credential to an identity
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, credential: &str) -> Result<ResolvedIdentity, AuthError>;
}

pub type SharedIdentityResolver = Arc<dyn IdentityResolver>;

/// Verifies HS256 tokens against a shared secret
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, credential: &str) -> Result<ResolvedIdentity, AuthError> {
        let token_data = decode::<Claims>(credential, &self.key, &self.validation)?;
        if token_data.claims.user_id.is_empty() {
            return Err(AuthError::MissingUserId);
        }
        Ok(token_data.claims.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "test-secret";

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn token(user_id: &str, role: &str, exp: u64, secret: &str) -> String {
        let claims = Claims {
            user_id: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            role: role.to_string(),
            exp,
            iat: now(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_valid_token() {
        let resolver = JwtIdentityResolver::new(SECRET);
        let identity = resolver
            .resolve(&token("u1", "admin", now() + 3600, SECRET))
            .unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.email, "u1@example.com");
        assert_eq!(identity.role, "admin");
    }

    #[test]
    fn test_empty_role_defaults_to_user() {
        let resolver = JwtIdentityResolver::new(SECRET);
        let identity = resolver
            .resolve(&token("u1", "", now() + 3600, SECRET))
            .unwrap();
        assert_eq!(identity.role, DEFAULT_ROLE);
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired() {
        let resolver = JwtIdentityResolver::new(SECRET);

        let forged = token("u1", "user", now() + 3600, "other-secret");
        assert!(matches!(resolver.resolve(&forged), Err(AuthError::InvalidToken(_))));

        let expired = token("u1", "user", now() - 3600, SECRET);
        assert!(matches!(resolver.resolve(&expired), Err(AuthError::InvalidToken(_))));

        assert!(matches!(resolver.resolve("garbage"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_empty_user_id() {
        let resolver = JwtIdentityResolver::new(SECRET);
        let anonymous = token("", "user", now() + 3600, SECRET);
        assert!(matches!(resolver.resolve(&anonymous), Err(AuthError::MissingUserId)));
    }
}
