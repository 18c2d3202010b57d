//! Dashboard endpoints
//!
//! The dashboard aggregates everything a user can see: the projects they
//! created or are on the team of, and the tasks they created or are
//! assigned to. Both unions are deduplicated in SQL, so an item the user
//! both created and belongs to appears exactly once.
//!
//! # Endpoints
//!
//! - `GET /v1/dashboard` - Aggregated view for the authenticated user
//! - `PATCH /v1/dashboard` - Update the authenticated user's email

use crate::{
    app::AppState,
    envelope::{Data, Envelope},
    error::{ApiError, ApiResult},
    routes::users::UserResponse,
};
use axum::{extract::State, Extension, Json};
use crewboard_shared::{
    auth::middleware::AuthContext,
    models::{project::Project, task::Task, user::User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Aggregated dashboard payload
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardData {
    /// The authenticated user
    pub user: UserResponse,

    /// Projects the user created or is a team member of (deduplicated)
    pub projects: Vec<Project>,

    /// Tasks the user created or is assigned to (deduplicated)
    pub tasks: Vec<Task>,
}

/// Email update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEmailRequest {
    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Dashboard aggregation handler
///
/// # Endpoint
///
/// ```text
/// GET /v1/dashboard
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "message": {
///     "data": {"user": {...}, "projects": [...], "tasks": [...]}
///   }
/// }
/// ```
pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Envelope<Data<DashboardData>>>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let projects = Project::list_for_user(&state.db, auth.user_id).await?;
    let tasks = Task::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(Envelope::ok(Data::new(DashboardData {
        user: user.into(),
        projects,
        tasks,
    }))))
}

/// Email update handler
///
/// Partially updates the authenticated user: only the email can change.
/// Uniqueness is enforced by the column constraint; a duplicate surfaces
/// as `409 Conflict`. The response carries a fixed confirmation message,
/// not the updated record.
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/dashboard
/// Authorization: Bearer <token>
/// Content-Type: application/json
///
/// {"email": "new@example.com"}
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Blank or malformed email
/// - `409 Conflict`: Email already in use by another user
pub async fn update_email(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateEmailRequest>,
) -> ApiResult<Json<Envelope<Data<String>>>> {
    if req.email.trim().is_empty() {
        return Err(ApiError::validation("email", "This field may not be blank"));
    }

    req.validate().map_err(crate::error::map_validation_errors)?;

    User::update_email(&state.db, auth.user_id, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "email updated");

    Ok(Json(Envelope::ok(Data::new(
        "email updated successfully".to_string(),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_email_fails_field_validation() {
        let req = UpdateEmailRequest {
            email: "not-an-email".to_string(),
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_valid_email_passes_field_validation() {
        let req = UpdateEmailRequest {
            email: "new@example.com".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
