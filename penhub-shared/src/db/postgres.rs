/// PostgreSQL-backed [`Store`]
///
/// Thin adapter over the model functions; sqlx errors are mapped through
/// `StoreError::from` so unique violations surface as `Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    pool::health_check,
    store::{Store, StoreResult},
};
use crate::models::{
    book::{Book, BookChanges, NewBook},
    chapter::{Chapter, ChapterChanges, ChapterOwnership, ChapterSummary, NewChapter},
    genre::Genre,
    rating::Rating,
    token::{NewToken, TokenRecord},
    user::{NewUser, StoredCredentials, User},
    DbId, Ownership,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }

    async fn login_exists(&self, login: &str) -> StoreResult<bool> {
        Ok(User::login_exists(&self.pool, login).await?)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_credentials(&self, login: &str) -> StoreResult<Option<StoredCredentials>> {
        Ok(User::find_credentials(&self.pool, login).await?)
    }

    async fn insert_token(&self, token: NewToken) -> StoreResult<()> {
        Ok(TokenRecord::insert(&self.pool, token).await?)
    }

    async fn find_token(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>> {
        Ok(TokenRecord::find_by_hash(&self.pool, token_hash).await?)
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<Book> {
        Ok(Book::create(&self.pool, book).await?)
    }

    async fn find_book(&self, id: DbId, viewer: DbId) -> StoreResult<Option<Book>> {
        Ok(Book::find_visible(&self.pool, id, viewer).await?)
    }

    async fn book_owner(&self, id: DbId) -> StoreResult<Option<Ownership>> {
        Ok(Book::owner(&self.pool, id).await?)
    }

    async fn update_book(&self, id: DbId, changes: BookChanges) -> StoreResult<Option<Book>> {
        Ok(Book::update(&self.pool, id, changes).await?)
    }

    async fn set_book_active(&self, id: DbId, active: bool) -> StoreResult<bool> {
        Ok(Book::set_active(&self.pool, id, active).await?)
    }

    async fn list_books_by_author(
        &self,
        author_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        Ok(Book::list_by_author(&self.pool, author_id, viewer, after, limit).await?)
    }

    async fn list_books_by_genre(
        &self,
        genre_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        Ok(Book::list_by_genre(&self.pool, genre_id, viewer, after, limit).await?)
    }

    async fn search_books_by_title(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        Ok(Book::search_by_title(&self.pool, prefix, viewer, limit).await?)
    }

    async fn search_books_by_author(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        Ok(Book::search_by_author(&self.pool, prefix, viewer, limit).await?)
    }

    async fn insert_chapter(&self, chapter: NewChapter) -> StoreResult<Chapter> {
        Ok(Chapter::create(&self.pool, chapter).await?)
    }

    async fn find_chapter(&self, id: DbId) -> StoreResult<Option<Chapter>> {
        Ok(Chapter::find_active(&self.pool, id).await?)
    }

    async fn chapter_owner(&self, id: DbId) -> StoreResult<Option<ChapterOwnership>> {
        Ok(Chapter::ownership(&self.pool, id).await?)
    }

    async fn update_chapter(
        &self,
        id: DbId,
        changes: ChapterChanges,
    ) -> StoreResult<Option<Chapter>> {
        Ok(Chapter::update(&self.pool, id, changes).await?)
    }

    async fn set_chapter_active(&self, id: DbId, active: bool) -> StoreResult<bool> {
        Ok(Chapter::set_active(&self.pool, id, active).await?)
    }

    async fn list_chapters(&self, book_id: DbId) -> StoreResult<Vec<ChapterSummary>> {
        Ok(Chapter::list_by_book(&self.pool, book_id).await?)
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(Genre::list_active(&self.pool).await?)
    }

    async fn find_genre(&self, id: DbId) -> StoreResult<Option<Genre>> {
        Ok(Genre::find_active(&self.pool, id).await?)
    }

    async fn search_genres(&self, prefix: &str, limit: i64) -> StoreResult<Vec<Genre>> {
        Ok(Genre::search_by_name(&self.pool, prefix, limit).await?)
    }

    async fn insert_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Rating> {
        Ok(Rating::create_or_get(&self.pool, book_id, user_id).await?)
    }

    async fn find_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Option<Rating>> {
        Ok(Rating::find(&self.pool, book_id, user_id).await?)
    }

    async fn find_rating_by_id(&self, id: DbId) -> StoreResult<Option<Rating>> {
        Ok(Rating::find_by_id(&self.pool, id).await?)
    }

    async fn delete_rating(&self, id: DbId) -> StoreResult<bool> {
        Ok(Rating::delete(&self.pool, id).await?)
    }

    async fn count_ratings(&self, book_id: DbId) -> StoreResult<i64> {
        Ok(Rating::count_for_book(&self.pool, book_id).await?)
    }
}
