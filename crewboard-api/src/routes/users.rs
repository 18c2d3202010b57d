//! User listing and registration endpoints
//!
//! # Endpoints
//!
//! - `GET /v1/users` - List all users (staff only)
//! - `POST /v1/users` - Register a new user (open to anyone)
//!
//! The two methods share one route but not one permission model: listing
//! requires an authenticated staff caller, while registration is the one
//! write any anonymous visitor may perform. The route therefore sits
//! behind the optional auth layer and each handler makes its own call.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use crewboard_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, User, UserRole},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public representation of a user
///
/// Password material never leaves the model layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Email address
    pub email: String,

    /// Role of the account
    pub role: UserRole,

    /// Given name
    pub first_name: String,

    /// Family name
    pub last_name: String,

    /// Whether the user has staff privileges
    pub is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Given name
    #[serde(default)]
    #[validate(length(max = 150, message = "first name must be at most 150 characters"))]
    pub first_name: String,

    /// Family name
    #[serde(default)]
    #[validate(length(max = 150, message = "last name must be at most 150 characters"))]
    pub last_name: String,

    /// Login name
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub username: String,

    /// Email address (blank and uniqueness checks happen in the handler)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Requested role; defaults to developer
    #[serde(default)]
    pub role: Option<UserRole>,

    /// Password
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub password: String,

    /// Password confirmation; must equal `password`, never stored
    pub password2: String,
}

/// Pagination parameters for the user list
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Maximum number of users to return (default 50)
    pub limit: Option<i64>,

    /// Number of users to skip (default 0)
    pub offset: Option<i64>,
}

/// List users (staff only)
///
/// # Endpoint
///
/// ```text
/// GET /v1/users?limit=50&offset=0
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No valid token presented
/// - `403 Forbidden`: Caller is not staff
pub async fn list_users(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let Some(Extension(auth)) = auth else {
        return Err(ApiError::Unauthorized("Authentication required".to_string()));
    };

    if !auth.is_staff {
        return Err(ApiError::Forbidden("Staff access required".to_string()));
    }

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let users = User::list(&state.db, limit, offset).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Register a new user (open to anyone)
///
/// # Endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// {
///   "first_name": "John",
///   "last_name": "Doe",
///   "username": "jdoe",
///   "email": "jdoe@example.com",
///   "role": "developer",
///   "password": "hunter2hunter2",
///   "password2": "hunter2hunter2"
/// }
/// ```
///
/// # Validation
///
/// In order: blank email, structural field checks, email uniqueness,
/// password confirmation. `password2` is discarded after the comparison;
/// only an Argon2id hash of `password` is stored. Self-registration never
/// grants the staff flag.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Username already taken (database constraint)
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if req.email.trim().is_empty() {
        return Err(ApiError::validation("email", "This field may not be blank"));
    }

    req.validate().map_err(crate::error::map_validation_errors)?;

    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::validation("email", "email already in use"));
    }

    if req.password != req.password2 {
        return Err(ApiError::validation("password2", "passwords do not match"));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role.unwrap_or(UserRole::Developer),
            is_staff: false,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, password: &str, password2: &str) -> CreateUserRequest {
        CreateUserRequest {
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: "tester".to_string(),
            email: email.to_string(),
            role: None,
            password: password.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_valid_request_passes_field_validation() {
        let req = request("tester@example.com", "secret-pass", "secret-pass");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_malformed_email_fails_field_validation() {
        let req = request("not-an-email", "secret-pass", "secret-pass");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_blank_password_fails_field_validation() {
        let req = request("tester@example.com", "", "");
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_user_response_hides_password_hash() {
        // Compile-time property, asserted via serialization: the public
        // shape has exactly the advertised fields.
        let value = serde_json::to_value(UserResponse {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            role: UserRole::Developer,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            is_staff: false,
        })
        .unwrap();

        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        assert!(!obj.contains_key("password_hash"));
    }
}
