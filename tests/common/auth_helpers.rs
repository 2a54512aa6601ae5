//! Authentication test helpers
//!
//! The relay only verifies tokens, so tests mint their own with the same
//! secret the test server is configured with.

use capsule_relay::backend::auth::Claims;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::{SystemTime, UNIX_EPOCH};

/// Secret every test relay is started with
pub const TEST_JWT_SECRET: &str = "relay-test-secret";

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Sign a token for `user_id` with an explicit secret and lifetime
pub fn create_token_with(secret: &str, user_id: &str, ttl_secs: i64) -> String {
    let iat = now();
    let exp = (iat as i64 + ttl_secs).max(0) as u64;
    let claims = Claims {
        user_id: user_id.to_string(),
        email: format!("{}@example.com", user_id),
        role: String::new(),
        exp,
        iat,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to create test token")
}

/// Generate a valid one-hour test token
pub fn create_test_token(user_id: &str) -> String {
    create_token_with(TEST_JWT_SECRET, user_id, 3600)
}
