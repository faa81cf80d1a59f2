/// Chapter model and database operations
///
/// A chapter is readable only while both it and its book are active. Lists are
/// ordered by `number`, ties broken by id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE chapters (
///     id BIGSERIAL PRIMARY KEY,
///     book_id BIGINT NOT NULL REFERENCES books(id),
///     number BIGINT NOT NULL CHECK (number >= 1),
///     name VARCHAR(200) NOT NULL,
///     content TEXT NOT NULL,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::DbId;

/// Full chapter including its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chapter {
    pub id: DbId,
    pub book_id: DbId,
    pub number: i64,
    pub name: String,
    pub content: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Table-of-contents entry (no body)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChapterSummary {
    pub id: DbId,
    pub book_id: DbId,
    pub number: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Chapter> for ChapterSummary {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            book_id: chapter.book_id,
            number: chapter.number,
            name: chapter.name.clone(),
            created_at: chapter.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewChapter {
    pub book_id: DbId,
    pub number: i64,
    pub name: String,
    pub content: String,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterChanges {
    pub number: Option<i64>,
    pub name: Option<String>,
    pub content: Option<String>,
}

impl ChapterChanges {
    pub fn is_empty(&self) -> bool {
        self.number.is_none() && self.name.is_none() && self.content.is_none()
    }
}

/// Who may mutate a chapter: the author of its book
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct ChapterOwnership {
    pub book_id: DbId,
    pub owner_id: DbId,
    pub active: bool,
    pub book_active: bool,
}

impl Chapter {
    pub async fn create(pool: &PgPool, data: NewChapter) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Chapter>(
            r#"
            INSERT INTO chapters (book_id, number, name, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, book_id, number, name, content, active, created_at
            "#,
        )
        .bind(data.book_id)
        .bind(data.number)
        .bind(data.name)
        .bind(data.content)
        .fetch_one(pool)
        .await
    }

    /// Active chapter by id; the caller checks the parent book separately
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chapter>(
            r#"
            SELECT id, book_id, number, name, content, active, created_at
            FROM chapters
            WHERE id = $1 AND active
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Ownership of a chapter regardless of its active flag
    pub async fn ownership(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ChapterOwnership>, sqlx::Error> {
        sqlx::query_as::<_, ChapterOwnership>(
            r#"
            SELECT c.book_id, b.author_id AS owner_id, c.active, b.active AS book_active
            FROM chapters c
            JOIN books b ON b.id = c.book_id
            WHERE c.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: ChapterChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Chapter>(
            r#"
            UPDATE chapters
            SET number = COALESCE($2, number),
                name = COALESCE($3, name),
                content = COALESCE($4, content)
            WHERE id = $1
            RETURNING id, book_id, number, name, content, active, created_at
            "#,
        )
        .bind(id)
        .bind(changes.number)
        .bind(changes.name)
        .bind(changes.content)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE chapters SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active chapters of a book in reading order
    pub async fn list_by_book(
        pool: &PgPool,
        book_id: DbId,
    ) -> Result<Vec<ChapterSummary>, sqlx::Error> {
        sqlx::query_as::<_, ChapterSummary>(
            r#"
            SELECT id, book_id, number, name, created_at
            FROM chapters
            WHERE book_id = $1 AND active
            ORDER BY number ASC, id ASC
            "#,
        )
        .bind(book_id)
        .fetch_all(pool)
        .await
    }
}
