/// Login token rows
///
/// Only the SHA-256 digest of a token is stored. Rows are never revoked or
/// deleted; an expired row simply stops resolving.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_tokens (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users(id),
///     token_hash CHAR(64) NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT user_tokens_token_hash_key UNIQUE (token_hash)
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::DbId;

/// Token to persist
#[derive(Debug, Clone)]
pub struct NewToken {
    /// Hex SHA-256 digest of the plaintext token
    pub token_hash: String,

    /// User the token authenticates
    pub user_id: DbId,

    /// Absolute expiry
    pub expires_at: DateTime<Utc>,
}

/// Stored token looked up by digest
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TokenRecord {
    pub user_id: DbId,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Persists a token digest
    pub async fn insert(pool: &PgPool, data: NewToken) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(data.user_id)
        .bind(data.token_hash)
        .bind(data.expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Exact-match lookup by digest
    pub async fn find_by_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TokenRecord>(
            "SELECT user_id, expires_at FROM user_tokens WHERE token_hash = $1",
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }
}
