//! Bearer-token authentication middleware for Axum
//!
//! The middleware extracts the opaque key from the `Authorization: Bearer`
//! header, resolves it to a user row, and injects an [`AuthContext`] into
//! the request extensions for handlers to consume.
//!
//! Two variants exist:
//!
//! - [`token_auth_middleware`] rejects requests without a valid token.
//!   Used for routes that require an authenticated caller.
//! - [`optional_token_auth_middleware`] never rejects; it injects the
//!   context when the token is valid and otherwise passes the request
//!   through anonymous. Used for routes whose permission decision is
//!   per-method (user list/create) or that treat anonymous callers as a
//!   no-op (logout).
//!
//! # Example
//!
//! ```no_run
//! use axum::{middleware, routing::get, Extension, Router};
//! use crewboard_shared::auth::middleware::{token_auth_middleware, AuthContext};
//! use sqlx::PgPool;
//!
//! async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
//!     format!("Hello, user {}!", auth.user_id)
//! }
//!
//! fn router(pool: PgPool) -> Router {
//!     Router::new()
//!         .route("/protected", get(protected_handler))
//!         .layer(middleware::from_fn(move |req, next| {
//!             token_auth_middleware(pool.clone(), req, next)
//!         }))
//! }
//! ```

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::token::Token;
use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor; routes behind
/// the optional middleware use `Option<Extension<AuthContext>>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Whether the user may perform administrative operations
    pub is_staff: bool,

    /// Role of the authenticated user
    pub role: UserRole,
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Invalid authorization header format
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token not found or no longer valid
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Database error during token lookup
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Extracts the bearer key from a request, if one is present
///
/// Returns `Ok(None)` when there is no Authorization header at all, and
/// an error when the header exists but is not a Bearer credential.
fn bearer_key(req: &Request) -> Result<Option<&str>, AuthError> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Header is not valid UTF-8".to_string()))?;

    let key = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    Ok(Some(key))
}

/// Bearer-token authentication middleware
///
/// Resolves the presented key to a user and injects [`AuthContext`].
///
/// # Errors
///
/// - `MissingCredentials` if no Authorization header is present
/// - `InvalidFormat` if the header is not a Bearer credential
/// - `InvalidToken` if the key matches no token row
/// - `DatabaseError` if the lookup itself fails
pub async fn token_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let key = bearer_key(&req)?.ok_or(AuthError::MissingCredentials)?;

    let user = Token::find_user_by_key(&pool, key)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AuthError::InvalidToken("Unknown or expired token".to_string()))?;

    let auth_context = AuthContext {
        user_id: user.id,
        is_staff: user.is_staff,
        role: user.role,
    };
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Optional bearer-token authentication middleware
///
/// Like [`token_auth_middleware`], but an absent, malformed, or unknown
/// credential leaves the request anonymous instead of rejecting it. Only
/// a database failure during lookup is surfaced as an error.
pub async fn optional_token_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if let Ok(Some(key)) = bearer_key(&req) {
        let user = Token::find_user_by_key(&pool, key)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        if let Some(user) = user {
            let auth_context = AuthContext {
                user_id: user.id,
                is_staff: user.is_staff,
                role: user.role,
            };
            req.extensions_mut().insert(auth_context);
        }
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_key_absent() {
        let req = request_with_auth(None);
        assert!(matches!(bearer_key(&req), Ok(None)));
    }

    #[test]
    fn test_bearer_key_present() {
        let req = request_with_auth(Some("Bearer abc123"));
        assert_eq!(bearer_key(&req).unwrap(), Some("abc123"));
    }

    #[test]
    fn test_bearer_key_wrong_scheme() {
        let req = request_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(bearer_key(&req), Err(AuthError::InvalidFormat(_))));
    }
}
