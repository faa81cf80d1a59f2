/// User model and database operations
///
/// Users are never hard-deleted. The `active` flag exists in the schema but no
/// code path toggles it today.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     login VARCHAR(64) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_login_key UNIQUE (login)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use penhub_shared::models::user::{NewUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, NewUser {
///     name: "Alice".to_string(),
///     login: "alice".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let creds = User::find_credentials(&pool, "alice").await?;
/// assert_eq!(creds.map(|c| c.user_id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::DbId;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: DbId,

    /// Display name (also used by author search)
    pub name: String,

    /// Login, unique among all users
    pub login: String,

    /// Argon2id password hash in PHC format
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the account is active
    pub active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name
    pub name: String,

    /// Login
    pub login: String,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Login lookup result used by the credential verifier
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredCredentials {
    /// Owner of the credentials
    pub user_id: DbId,

    /// Stored Argon2id hash
    pub password_hash: String,
}

impl User {
    /// Inserts a user and returns the stored row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation on `users_login_key` when the login is
    /// already registered.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, login, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, login, password_hash, active, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.login)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a login is taken, active or not
    pub async fn login_exists(pool: &PgPool, login: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE login = $1)")
            .bind(login)
            .fetch_one(pool)
            .await
    }

    /// Fetches the id and password hash stored for a login
    pub async fn find_credentials(
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<StoredCredentials>, sqlx::Error> {
        sqlx::query_as::<_, StoredCredentials>(
            "SELECT id AS user_id, password_hash FROM users WHERE login = $1",
        )
        .bind(login)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            name: "Alice".to_string(),
            login: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            active: true,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["login"], "alice");
    }
}
