//! Login and logout endpoints
//!
//! Credentials are exchanged for an opaque bearer token. Token issuance
//! is idempotent: the same key comes back on every login until logout
//! deletes it.
//!
//! # Endpoints
//!
//! - `POST /v1/login` - Exchange username/password for a token
//! - `POST /v1/logout` - Invalidate the caller's token

use crate::{
    app::AppState,
    envelope::{Data, Envelope},
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use crewboard_shared::{
    auth::{middleware::AuthContext, password},
    models::{token::Token, user::User},
};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Login success payload
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenMessage {
    /// The bearer key to present on subsequent requests
    pub token: String,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/login
/// Content-Type: application/json
///
/// {"username": "jdoe", "password": "hunter2hunter2"}
/// ```
///
/// # Response
///
/// ```json
/// {"status": "ok", "message": {"token": "9c3f..."}}
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password. The two
///   cases are deliberately indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<Envelope<TokenMessage>>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("invalid credentials".to_string()));
    }

    let (token, created) = Token::get_or_create(&state.db, user.id).await?;
    if created {
        tracing::debug!(user_id = %user.id, "issued new auth token");
    }

    User::update_last_login(&state.db, user.id).await?;

    Ok(Json(Envelope::ok(TokenMessage { token: token.key })))
}

/// Logout endpoint
///
/// Anonymous callers get the success envelope back with no side effects,
/// so logout is always safe to call. For authenticated callers the token
/// row is deleted; a token that is already gone counts as logged out.
/// Only a genuine database failure produces the 500 fail envelope, and
/// its cause is logged before being masked.
///
/// # Endpoint
///
/// ```text
/// POST /v1/logout
/// Authorization: Bearer <token>   (optional)
/// ```
///
/// # Response
///
/// ```json
/// {"status": "ok", "message": {"data": "logged out"}}
/// ```
pub async fn logout(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
) -> ApiResult<Json<Envelope<Data<String>>>> {
    if let Some(Extension(auth)) = auth {
        let deleted = Token::delete_for_user(&state.db, auth.user_id).await?;
        if !deleted {
            // Token vanished between authentication and deletion; the
            // caller is logged out either way.
            tracing::debug!(user_id = %auth.user_id, "logout found no token to delete");
        }
    }

    Ok(Json(Envelope::ok(Data::new("logged out".to_string()))))
}
