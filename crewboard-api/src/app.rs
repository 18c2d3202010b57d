//! Application state and router builder
//!
//! This module defines the shared application state and provides a
//! function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use crewboard_api::{app::AppState, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = crewboard_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use crewboard_shared::auth::middleware as token_auth;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<crate::config::Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: crate::config::Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health              # Health check (public)
/// └── /v1/                 # API v1 (versioned)
///     ├── POST /login      # Exchange credentials for a token (public)
///     ├── POST /logout     # Invalidate token (optional auth, no-op anonymous)
///     ├── GET  /users      # List users (staff only)
///     ├── POST /users      # Register (open to anyone)
///     ├── GET  /dashboard  # Aggregated projects/tasks (authenticated)
///     └── PATCH /dashboard # Update own email (authenticated)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Authentication (per-route basis: required, optional, or none)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Login is public; credentials are the authentication
    let login_routes = Router::new().route("/login", post(routes::auth::login));

    // Routes that authenticate when a token is presented but never reject:
    // user list/create decides per-method in the handler, and anonymous
    // logout is an idempotent no-op
    let optional_auth_routes = Router::new()
        .route(
            "/users",
            get(routes::users::list_users).post(routes::users::create_user),
        )
        .route("/logout", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            optional_token_auth_layer,
        ));

    // Dashboard requires an authenticated caller
    let protected_routes = Router::new()
        .route(
            "/dashboard",
            get(routes::dashboard::get_dashboard).patch(routes::dashboard::update_email),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            token_auth_layer,
        ));

    let v1_routes = Router::new()
        .merge(login_routes)
        .merge(optional_auth_routes)
        .merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::security::security_headers,
        ))
        .with_state(state)
}

/// Required bearer-token authentication layer
///
/// Resolves the presented key to a user and injects `AuthContext`;
/// rejects requests without a valid token.
async fn token_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    token_auth::token_auth_middleware(state.db.clone(), req, next)
        .await
        .map_err(ApiError::from)
}

/// Optional bearer-token authentication layer
///
/// Injects `AuthContext` when a valid token is presented and otherwise
/// passes the request through anonymous.
async fn optional_token_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    token_auth::optional_token_auth_middleware(state.db.clone(), req, next)
        .await
        .map_err(ApiError::from)
}
