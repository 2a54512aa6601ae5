/**
 * Authentication Middleware
 *
 * Protects the chat upgrade route. Reads the caller's credential from the
 * `Authorization: Bearer` header or, for browser clients that cannot set
 * headers on a WebSocket, the `token` query parameter. The resolved
 * identity is attached to the request extensions for the handler.
 *
 * Returns 401 Unauthorized if the credential is missing or invalid; the
 * upgrade is never attempted.
 */

use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::backend::auth::{ResolvedIdentity, SharedIdentityResolver};
use crate::backend::error::BackendError;
use crate::shared::messaging::Identity;

/// Authenticated user data extracted from the credential
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Identity,
    pub email: String,
    pub role: String,
}

impl From<ResolvedIdentity> for AuthenticatedUser {
    fn from(identity: ResolvedIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            email: identity.email,
            role: identity.role,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Find the caller's credential
///
/// The bearer header wins over the query parameter. Empty values count as
/// absent.
pub fn extract_credential(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware
///
/// 1. Extracts the credential (header or query)
/// 2. Resolves it through the configured `IdentityResolver`
/// 3. Attaches `AuthenticatedUser` to the request extensions
pub async fn auth_middleware(
    State(resolver): State<SharedIdentityResolver>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let credential = extract_credential(request.headers(), request.uri()).ok_or_else(|| {
        tracing::warn!(path = %request.uri().path(), "Missing credentials");
        BackendError::unauthorized("missing credentials")
    })?;

    let identity = resolver.resolve(&credential).map_err(|e| {
        tracing::warn!(error = %e, "Invalid credentials");
        BackendError::from(e)
    })?;

    tracing::debug!(user_id = %identity.user_id, role = %identity.role, "Request authenticated");
    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(identity));

    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind [`auth_middleware`].
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("missing credentials")
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            extract_credential(&headers, &uri("/ws/chat")),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_query_token() {
        let headers = HeaderMap::new();
        assert_eq!(
            extract_credential(&headers, &uri("/ws/chat?token=abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_header_wins_over_query() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(
            extract_credential(&headers, &uri("/ws/chat?token=from-query")),
            Some("from-header".to_string())
        );
    }

    #[test]
    fn test_missing_or_empty_credentials() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_credential(&headers, &uri("/ws/chat")), None);
        assert_eq!(extract_credential(&headers, &uri("/ws/chat?token=")), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_credential(&headers, &uri("/ws/chat")), None);
    }

    #[tokio::test]
    async fn test_extractor_without_middleware_is_unauthorized() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/ws/chat")
            .body(())
            .unwrap()
            .into_parts();

        let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_extractor_reads_extension() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/ws/chat")
            .body(())
            .unwrap()
            .into_parts();
        let user = AuthenticatedUser {
            user_id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            role: "user".to_string(),
        };
        parts.extensions.insert(user.clone());

        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, user);
    }
}
