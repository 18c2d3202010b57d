//! Database utilities
//!
//! - `pool`: PostgreSQL connection pool management
//! - `migrations`: Migration runner built on sqlx's embedded migrations

pub mod migrations;
pub mod pool;
