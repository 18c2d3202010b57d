//! Common test utilities for integration tests
//!
//! Shared infrastructure for the end-to-end tests:
//! - Test database setup (migrations run on connect)
//! - Seeded regular and staff users with a known password
//! - Token issuance and request helpers

use axum::body::Body;
use axum::http::{Request, Response};
use crewboard_api::app::{build_router, AppState};
use crewboard_api::config::Config;
use crewboard_shared::auth::password::hash_password;
use crewboard_shared::models::token::Token;
use crewboard_shared::models::user::{CreateUser, User, UserRole};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Password used for every seeded user
pub const TEST_PASSWORD: &str = "TestPass123!";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,

    /// Seeded non-staff user
    pub user: User,

    /// Seeded staff user
    pub staff: User,
}

impl TestContext {
    /// Creates a new test context against the database from the environment
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let password_hash = hash_password(TEST_PASSWORD)?;

        let user = User::create(
            &db,
            CreateUser {
                username: unique("dev"),
                email: format!("{}@example.com", unique("dev")),
                password_hash: password_hash.clone(),
                first_name: "Test".to_string(),
                last_name: "Developer".to_string(),
                role: UserRole::Developer,
                is_staff: false,
            },
        )
        .await?;

        let staff = User::create(
            &db,
            CreateUser {
                username: unique("staff"),
                email: format!("{}@example.com", unique("staff")),
                password_hash,
                first_name: "Test".to_string(),
                last_name: "Staff".to_string(),
                role: UserRole::Admin,
                is_staff: true,
            },
        )
        .await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            staff,
        })
    }

    /// Issues (or fetches) a bearer token for a user and returns the
    /// Authorization header value
    pub async fn auth_header_for(&self, user_id: Uuid) -> anyhow::Result<String> {
        let (token, _) = Token::get_or_create(&self.db, user_id).await?;
        Ok(format!("Bearer {}", token.key))
    }

    /// Sends a request through the router
    pub async fn call(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Cleans up seeded users (tokens cascade)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        User::delete(&self.db, self.staff.id).await?;
        Ok(())
    }
}

/// Generates a unique name with the given prefix
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Builds a JSON POST request
pub fn post_json(uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a JSON PATCH request
pub fn patch_json(uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Builds a GET request
pub fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Collects every message string in a validation error body
pub fn validation_messages(body: &serde_json::Value) -> Vec<String> {
    body["message"]["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
