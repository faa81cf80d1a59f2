/// Ratings ("likes")
///
/// One rating per (book, user): the `ratings_book_user_key` constraint makes a
/// repeated like a no-op that hands back the existing row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rating {
    pub id: DbId,
    pub book_id: DbId,
    pub user_id: DbId,
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Inserts a like or returns the one already recorded for the pair
    pub async fn create_or_get(
        pool: &PgPool,
        book_id: DbId,
        user_id: DbId,
    ) -> Result<Self, sqlx::Error> {
        let inserted = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (book_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT ratings_book_user_key DO NOTHING
            RETURNING id, book_id, user_id, created_at
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        match inserted {
            Some(rating) => Ok(rating),
            None => Self::find(pool, book_id, user_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn find(
        pool: &PgPool,
        book_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Rating>(
            "SELECT id, book_id, user_id, created_at FROM ratings WHERE book_id = $1 AND user_id = $2",
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Rating>(
            "SELECT id, book_id, user_id, created_at FROM ratings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Ratings are the one hard-deleted entity
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_for_book(pool: &PgPool, book_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(pool)
            .await
    }
}
