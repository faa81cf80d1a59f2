/// Book model and database operations
///
/// Books are soft-deleted through the `active` flag. Every read and list query
/// in this module filters `active` inside the SQL and restricts private books
/// (`access_read = FALSE`) to their author, passed in as `viewer`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE books (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     author_id BIGINT NOT NULL REFERENCES users(id),
///     genre_id BIGINT NOT NULL REFERENCES genres(id),
///     description TEXT NOT NULL DEFAULT '',
///     cover_image VARCHAR(255),
///     access_read BOOLEAN NOT NULL DEFAULT TRUE,
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::{like_prefix_pattern, DbId, Ownership};

const BOOK_COLUMNS: &str = "b.id, b.title, b.author_id, b.genre_id, b.description, \
                            b.cover_image, b.access_read, b.active, b.created_at";

/// Book written by a single author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub author_id: DbId,
    pub genre_id: DbId,
    pub description: String,

    /// Cover image file name; the bytes live outside the database
    pub cover_image: Option<String>,

    /// Whether readers other than the author may read the book
    pub access_read: bool,

    /// Soft-delete flag
    pub active: bool,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a book
#[derive(Debug, Clone)]
pub struct NewBook {
    pub title: String,
    pub author_id: DbId,
    pub genre_id: DbId,
    pub description: String,
    pub cover_image: Option<String>,
    pub access_read: bool,
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre_id: Option<DbId>,
    pub cover_image: Option<String>,
    pub access_read: Option<bool>,
}

impl BookChanges {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.genre_id.is_none()
            && self.cover_image.is_none()
            && self.access_read.is_none()
    }
}

impl Book {
    /// True when `viewer` may see this book in reads and listings
    pub fn is_visible_to(&self, viewer: DbId) -> bool {
        self.active && (self.access_read || self.author_id == viewer)
    }

    pub async fn create(pool: &PgPool, data: NewBook) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, genre_id, description, cover_image, access_read)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author_id, genre_id, description, cover_image,
                      access_read, active, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.author_id)
        .bind(data.genre_id)
        .bind(data.description)
        .bind(data.cover_image)
        .bind(data.access_read)
        .fetch_one(pool)
        .await
    }

    /// Point lookup of an active book visible to `viewer`
    pub async fn find_visible(
        pool: &PgPool,
        id: DbId,
        viewer: DbId,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b \
             WHERE b.id = $1 AND b.active AND (b.access_read OR b.author_id = $2)"
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(viewer)
            .fetch_optional(pool)
            .await
    }

    /// Owner of a book regardless of its active flag
    pub async fn owner(pool: &PgPool, id: DbId) -> Result<Option<Ownership>, sqlx::Error> {
        sqlx::query_as::<_, Ownership>(
            "SELECT author_id AS owner_id, active FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Applies a partial update and returns the updated row
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: BookChanges,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                genre_id = COALESCE($4, genre_id),
                cover_image = COALESCE($5, cover_image),
                access_read = COALESCE($6, access_read)
            WHERE id = $1
            RETURNING id, title, author_id, genre_id, description, cover_image,
                      access_read, active, created_at
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.genre_id)
        .bind(changes.cover_image)
        .bind(changes.access_read)
        .fetch_optional(pool)
        .await
    }

    /// Sets the soft-delete flag; true if the row exists
    pub async fn set_active(pool: &PgPool, id: DbId, active: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE books SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Keyset page of an author's books: `id > after`, ascending
    pub async fn list_by_author(
        pool: &PgPool,
        author_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b \
             WHERE b.author_id = $1 AND b.id > $2 AND b.active \
               AND (b.access_read OR b.author_id = $3) \
             ORDER BY b.id ASC LIMIT $4"
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(author_id)
            .bind(after)
            .bind(viewer)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Keyset page of a genre's books: `id > after`, ascending
    pub async fn list_by_genre(
        pool: &PgPool,
        genre_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b \
             WHERE b.genre_id = $1 AND b.id > $2 AND b.active \
               AND (b.access_read OR b.author_id = $3) \
             ORDER BY b.id ASC LIMIT $4"
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(genre_id)
            .bind(after)
            .bind(viewer)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Books whose title starts with `prefix`
    pub async fn search_by_title(
        pool: &PgPool,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b \
             WHERE b.title LIKE $1 ESCAPE '\\' AND b.active \
               AND (b.access_read OR b.author_id = $2) \
             ORDER BY b.id ASC LIMIT $3"
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(like_prefix_pattern(prefix))
            .bind(viewer)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Books whose author's display name starts with `prefix`
    pub async fn search_by_author(
        pool: &PgPool,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {BOOK_COLUMNS} FROM books b \
             JOIN users u ON u.id = b.author_id \
             WHERE u.name LIKE $1 ESCAPE '\\' AND b.active \
               AND (b.access_read OR b.author_id = $2) \
             ORDER BY b.id ASC LIMIT $3"
        );

        sqlx::query_as::<_, Book>(&query)
            .bind(like_prefix_pattern(prefix))
            .bind(viewer)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(author_id: DbId, access_read: bool, active: bool) -> Book {
        Book {
            id: 1,
            title: "Dune".to_string(),
            author_id,
            genre_id: 1,
            description: String::new(),
            cover_image: None,
            access_read,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_visibility_rules() {
        assert!(book(1, true, true).is_visible_to(2));
        assert!(book(1, false, true).is_visible_to(1));
        assert!(!book(1, false, true).is_visible_to(2));
        assert!(!book(1, true, false).is_visible_to(1));
    }

    #[test]
    fn test_book_changes_is_empty() {
        assert!(BookChanges::default().is_empty());

        let changes = BookChanges {
            access_read: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
