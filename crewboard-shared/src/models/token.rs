//! Bearer token model and database operations
//!
//! This module provides the Token model: an opaque random key that is the
//! sole bearer credential for a user. Each user has at most one token; it
//! is created on first successful login, handed back verbatim on every
//! subsequent login, and deleted on logout.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE auth_tokens (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
//!     key VARCHAR(64) NOT NULL UNIQUE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use crewboard_shared::models::token::Token;
//! use crewboard_shared::db::pool::{create_pool, DatabaseConfig};
//! use uuid::Uuid;
//!
//! # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let (token, created) = Token::get_or_create(&pool, user_id).await?;
//! println!("token key: {} (new: {})", token.key, created);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::user::User;

/// Length of a generated token key
const KEY_LENGTH: usize = 40;

/// Bearer token model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Token {
    /// Unique token ID
    pub id: Uuid,

    /// User this token authenticates (one token per user)
    pub user_id: Uuid,

    /// Opaque random key presented as the bearer credential
    pub key: String,

    /// When the token was created
    pub created_at: DateTime<Utc>,
}

impl Token {
    /// Generates a secure random token key
    ///
    /// 40 lowercase hex characters drawn from the thread RNG.
    ///
    /// # Example
    ///
    /// ```
    /// use crewboard_shared::models::token::Token;
    ///
    /// let key = Token::generate_key();
    /// assert_eq!(key.len(), 40);
    /// assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    pub fn generate_key() -> String {
        use rand::Rng;
        const CHARSET: &[u8] = b"0123456789abcdef";
        let mut rng = rand::thread_rng();

        (0..KEY_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Fetches the user's token, creating it if absent
    ///
    /// Issuance is idempotent: the same key is returned for every call
    /// until the token is deleted. Concurrent first logins converge on a
    /// single row via the unique constraint on `user_id` — the losing
    /// insert falls back to reading the winner's row.
    ///
    /// # Returns
    ///
    /// Tuple of (token, whether a new row was created)
    pub async fn get_or_create(pool: &PgPool, user_id: Uuid) -> Result<(Self, bool), sqlx::Error> {
        if let Some(token) = Self::find_by_user(pool, user_id).await? {
            return Ok((token, false));
        }

        let key = Self::generate_key();
        let inserted = sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO auth_tokens (user_id, key)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, key, created_at
            "#,
        )
        .bind(user_id)
        .bind(&key)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(token) => Ok((token, true)),
            // Lost the race: another login created the row first
            None => {
                let token = Self::find_by_user(pool, user_id)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok((token, false))
            }
        }
    }

    /// Finds the token belonging to a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, Token>(
            "SELECT id, user_id, key, created_at FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Resolves a presented key to the user it authenticates
    ///
    /// Single join query; returns None for unknown keys.
    pub async fn find_user_by_key(pool: &PgPool, key: &str) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.first_name, u.last_name,
                   u.role, u.is_staff, u.created_at, u.updated_at, u.last_login_at
            FROM users u
            INNER JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes the token belonging to a user
    ///
    /// # Returns
    ///
    /// True if a token was deleted, false if the user had none — callers
    /// treat the latter as an already-logged-out no-op, not a failure.
    pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_key_length_and_charset() {
        let key = Token::generate_key();
        assert_eq!(key.len(), 40);
        assert!(key.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn test_generate_key_is_random() {
        let a = Token::generate_key();
        let b = Token::generate_key();
        assert_ne!(a, b);
    }
}
