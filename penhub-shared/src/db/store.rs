/// Persistence seam
///
/// Everything above the database talks to a `Store`. Two implementations
/// exist: [`PgStore`](super::postgres::PgStore) for PostgreSQL and
/// [`MemoryStore`](super::memory::MemoryStore), an in-process store with the
/// same semantics used by tests and local demos.
///
/// # Contract
///
/// - Read and list methods for books and chapters return only active rows;
///   book reads additionally hide private books from everyone but their author
///   (`viewer`).
/// - Ownership lookups (`book_owner`, `chapter_owner`) ignore the active flag
///   so soft-deleted rows can be restored by their owner.
/// - Keyset lists return rows with `id > after`, ascending, at most `limit`.
/// - Prefix searches match literally (no wildcards) and are case-sensitive.
///
/// # Example
///
/// ```
/// use penhub_shared::db::{memory::MemoryStore, store::Store};
///
/// # async fn example() -> Result<(), penhub_shared::db::store::StoreError> {
/// let store = MemoryStore::new();
/// assert!(!store.login_exists("alice").await?);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use crate::models::{
    book::{Book, BookChanges, NewBook},
    chapter::{Chapter, ChapterChanges, ChapterOwnership, ChapterSummary, NewChapter},
    genre::Genre,
    rating::Rating,
    token::{NewToken, TokenRecord},
    user::{NewUser, StoredCredentials, User},
    DbId, Ownership,
};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule rejected the write (name of the violated constraint)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for health endpoints
    async fn ping(&self) -> StoreResult<()>;

    // Users

    async fn login_exists(&self, login: &str) -> StoreResult<bool>;

    /// Fails with `Conflict` when the login is already taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_credentials(&self, login: &str) -> StoreResult<Option<StoredCredentials>>;

    // Tokens

    async fn insert_token(&self, token: NewToken) -> StoreResult<()>;

    async fn find_token(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>>;

    // Books

    async fn insert_book(&self, book: NewBook) -> StoreResult<Book>;

    async fn find_book(&self, id: DbId, viewer: DbId) -> StoreResult<Option<Book>>;

    async fn book_owner(&self, id: DbId) -> StoreResult<Option<Ownership>>;

    async fn update_book(&self, id: DbId, changes: BookChanges) -> StoreResult<Option<Book>>;

    /// Returns false when no such book exists
    async fn set_book_active(&self, id: DbId, active: bool) -> StoreResult<bool>;

    async fn list_books_by_author(
        &self,
        author_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>>;

    async fn list_books_by_genre(
        &self,
        genre_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>>;

    async fn search_books_by_title(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>>;

    async fn search_books_by_author(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>>;

    // Chapters

    async fn insert_chapter(&self, chapter: NewChapter) -> StoreResult<Chapter>;

    async fn find_chapter(&self, id: DbId) -> StoreResult<Option<Chapter>>;

    async fn chapter_owner(&self, id: DbId) -> StoreResult<Option<ChapterOwnership>>;

    async fn update_chapter(
        &self,
        id: DbId,
        changes: ChapterChanges,
    ) -> StoreResult<Option<Chapter>>;

    /// Returns false when no such chapter exists
    async fn set_chapter_active(&self, id: DbId, active: bool) -> StoreResult<bool>;

    async fn list_chapters(&self, book_id: DbId) -> StoreResult<Vec<ChapterSummary>>;

    // Genres

    async fn list_genres(&self) -> StoreResult<Vec<Genre>>;

    async fn find_genre(&self, id: DbId) -> StoreResult<Option<Genre>>;

    async fn search_genres(&self, prefix: &str, limit: i64) -> StoreResult<Vec<Genre>>;

    // Ratings

    /// Idempotent: returns the existing rating for the pair if there is one
    async fn insert_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Rating>;

    async fn find_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Option<Rating>>;

    async fn find_rating_by_id(&self, id: DbId) -> StoreResult<Option<Rating>>;

    async fn delete_rating(&self, id: DbId) -> StoreResult<bool>;

    async fn count_ratings(&self, book_id: DbId) -> StoreResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_database_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Conflict("users_login_key".to_string());
        assert_eq!(err.to_string(), "Conflict: users_login_key");
    }
}
