//! API route handlers
//!
//! This module contains all route handlers organized by resource:
//!
//! - `health`: Health check endpoint
//! - `users`: User listing and registration
//! - `auth`: Login and logout
//! - `dashboard`: Per-user project/task aggregation and email update

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod users;
