//! Database models for Crewboard
//!
//! This module contains all database models and their CRUD operations.
//!
//! # Models
//!
//! - `user`: User accounts and credentials
//! - `token`: Opaque bearer tokens (one per user)
//! - `project`: Projects and team membership
//! - `task`: Tasks and developer assignment
//!
//! # Example
//!
//! ```no_run
//! use crewboard_shared::models::user::{CreateUser, User, UserRole};
//! use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let user = User::create(&pool, CreateUser {
//!     username: "jdoe".to_string(),
//!     email: "jdoe@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     first_name: "John".to_string(),
//!     last_name: "Doe".to_string(),
//!     role: UserRole::Developer,
//!     is_staff: false,
//! }).await?;
//! # Ok(())
//! # }
//! ```

pub mod project;
pub mod task;
pub mod token;
pub mod user;
