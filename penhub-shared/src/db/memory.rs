/// In-process [`Store`] with the same visibility and uniqueness rules as the
/// PostgreSQL schema
///
/// Used by the test suites of both crates and by local demos that run without
/// a database. Genres are seeded with the same rows as the initial migration.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::store::{Store, StoreError, StoreResult};
use crate::models::{
    book::{Book, BookChanges, NewBook},
    chapter::{Chapter, ChapterChanges, ChapterOwnership, ChapterSummary, NewChapter},
    genre::Genre,
    rating::Rating,
    token::{NewToken, TokenRecord},
    user::{NewUser, StoredCredentials, User},
    DbId, Ownership,
};

/// Genre names inserted by the initial migration, in id order
pub const SEED_GENRES: [&str; 6] = [
    "Fantasy",
    "Science Fiction",
    "Mystery",
    "Romance",
    "Poetry",
    "Non-fiction",
];

#[derive(Debug, Default)]
struct Tables {
    next_id: DbId,
    users: BTreeMap<DbId, User>,
    tokens: BTreeMap<String, TokenRecord>,
    books: BTreeMap<DbId, Book>,
    chapters: BTreeMap<DbId, Chapter>,
    genres: BTreeMap<DbId, Genre>,
    ratings: BTreeMap<DbId, Rating>,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn visible_books<'a>(
        &'a self,
        viewer: DbId,
    ) -> impl Iterator<Item = &'a Book> + 'a {
        self.books.values().filter(move |b| b.is_visible_to(viewer))
    }
}

fn page(books: impl Iterator<Item = Book>, after: DbId, limit: i64) -> Vec<Book> {
    books.filter(|b| b.id > after).take(take(limit)).collect()
}

fn take(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

#[derive(Debug)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with the seeded genres
    pub fn new() -> Self {
        let mut tables = Tables::default();
        for name in SEED_GENRES {
            let id = tables.next_id();
            tables.genres.insert(
                id,
                Genre {
                    id,
                    name: name.to_string(),
                    active: true,
                },
            );
        }

        Self {
            tables: Mutex::new(tables),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Id of the seeded genre with this name
    pub fn genre_id(&self, name: &str) -> Option<DbId> {
        self.lock()
            .genres
            .values()
            .find(|g| g.name == name)
            .map(|g| g.id)
    }

    /// Number of stored token rows
    pub fn token_count(&self) -> usize {
        self.lock().tokens.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn login_exists(&self, login: &str) -> StoreResult<bool> {
        Ok(self.lock().users.values().any(|u| u.login == login))
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.lock();
        if tables.users.values().any(|u| u.login == user.login) {
            return Err(StoreError::Conflict("users_login_key".to_string()));
        }

        let id = tables.next_id();
        let row = User {
            id,
            name: user.name,
            login: user.login,
            password_hash: user.password_hash,
            active: true,
            created_at: Utc::now(),
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn find_credentials(&self, login: &str) -> StoreResult<Option<StoredCredentials>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.login == login)
            .map(|u| StoredCredentials {
                user_id: u.id,
                password_hash: u.password_hash.clone(),
            }))
    }

    async fn insert_token(&self, token: NewToken) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.tokens.contains_key(&token.token_hash) {
            return Err(StoreError::Conflict("user_tokens_token_hash_key".to_string()));
        }

        tables.tokens.insert(
            token.token_hash,
            TokenRecord {
                user_id: token.user_id,
                expires_at: token.expires_at,
            },
        );
        Ok(())
    }

    async fn find_token(&self, token_hash: &str) -> StoreResult<Option<TokenRecord>> {
        Ok(self.lock().tokens.get(token_hash).cloned())
    }

    async fn insert_book(&self, book: NewBook) -> StoreResult<Book> {
        let mut tables = self.lock();
        let id = tables.next_id();
        let row = Book {
            id,
            title: book.title,
            author_id: book.author_id,
            genre_id: book.genre_id,
            description: book.description,
            cover_image: book.cover_image,
            access_read: book.access_read,
            active: true,
            created_at: Utc::now(),
        };
        tables.books.insert(id, row.clone());
        Ok(row)
    }

    async fn find_book(&self, id: DbId, viewer: DbId) -> StoreResult<Option<Book>> {
        Ok(self
            .lock()
            .books
            .get(&id)
            .filter(|b| b.is_visible_to(viewer))
            .cloned())
    }

    async fn book_owner(&self, id: DbId) -> StoreResult<Option<Ownership>> {
        Ok(self.lock().books.get(&id).map(|b| Ownership {
            owner_id: b.author_id,
            active: b.active,
        }))
    }

    async fn update_book(&self, id: DbId, changes: BookChanges) -> StoreResult<Option<Book>> {
        let mut tables = self.lock();
        let Some(book) = tables.books.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            book.title = title;
        }
        if let Some(description) = changes.description {
            book.description = description;
        }
        if let Some(genre_id) = changes.genre_id {
            book.genre_id = genre_id;
        }
        if let Some(cover_image) = changes.cover_image {
            book.cover_image = Some(cover_image);
        }
        if let Some(access_read) = changes.access_read {
            book.access_read = access_read;
        }

        Ok(Some(book.clone()))
    }

    async fn set_book_active(&self, id: DbId, active: bool) -> StoreResult<bool> {
        let mut tables = self.lock();
        match tables.books.get_mut(&id) {
            Some(book) => {
                book.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_books_by_author(
        &self,
        author_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        let tables = self.lock();
        let books = tables
            .visible_books(viewer)
            .filter(|b| b.author_id == author_id)
            .cloned();
        Ok(page(books, after, limit))
    }

    async fn list_books_by_genre(
        &self,
        genre_id: DbId,
        viewer: DbId,
        after: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        let tables = self.lock();
        let books = tables
            .visible_books(viewer)
            .filter(|b| b.genre_id == genre_id)
            .cloned();
        Ok(page(books, after, limit))
    }

    async fn search_books_by_title(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        let tables = self.lock();
        Ok(tables
            .visible_books(viewer)
            .filter(|b| b.title.starts_with(prefix))
            .take(take(limit))
            .cloned()
            .collect())
    }

    async fn search_books_by_author(
        &self,
        prefix: &str,
        viewer: DbId,
        limit: i64,
    ) -> StoreResult<Vec<Book>> {
        let tables = self.lock();
        Ok(tables
            .visible_books(viewer)
            .filter(|b| {
                tables
                    .users
                    .get(&b.author_id)
                    .is_some_and(|u| u.name.starts_with(prefix))
            })
            .take(take(limit))
            .cloned()
            .collect())
    }

    async fn insert_chapter(&self, chapter: NewChapter) -> StoreResult<Chapter> {
        let mut tables = self.lock();
        let id = tables.next_id();
        let row = Chapter {
            id,
            book_id: chapter.book_id,
            number: chapter.number,
            name: chapter.name,
            content: chapter.content,
            active: true,
            created_at: Utc::now(),
        };
        tables.chapters.insert(id, row.clone());
        Ok(row)
    }

    async fn find_chapter(&self, id: DbId) -> StoreResult<Option<Chapter>> {
        Ok(self.lock().chapters.get(&id).filter(|c| c.active).cloned())
    }

    async fn chapter_owner(&self, id: DbId) -> StoreResult<Option<ChapterOwnership>> {
        let tables = self.lock();
        Ok(tables.chapters.get(&id).and_then(|chapter| {
            tables.books.get(&chapter.book_id).map(|book| ChapterOwnership {
                book_id: book.id,
                owner_id: book.author_id,
                active: chapter.active,
                book_active: book.active,
            })
        }))
    }

    async fn update_chapter(
        &self,
        id: DbId,
        changes: ChapterChanges,
    ) -> StoreResult<Option<Chapter>> {
        let mut tables = self.lock();
        let Some(chapter) = tables.chapters.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(number) = changes.number {
            chapter.number = number;
        }
        if let Some(name) = changes.name {
            chapter.name = name;
        }
        if let Some(content) = changes.content {
            chapter.content = content;
        }

        Ok(Some(chapter.clone()))
    }

    async fn set_chapter_active(&self, id: DbId, active: bool) -> StoreResult<bool> {
        let mut tables = self.lock();
        match tables.chapters.get_mut(&id) {
            Some(chapter) => {
                chapter.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_chapters(&self, book_id: DbId) -> StoreResult<Vec<ChapterSummary>> {
        let tables = self.lock();
        let mut chapters: Vec<ChapterSummary> = tables
            .chapters
            .values()
            .filter(|c| c.book_id == book_id && c.active)
            .map(ChapterSummary::from)
            .collect();
        chapters.sort_by_key(|c| (c.number, c.id));
        Ok(chapters)
    }

    async fn list_genres(&self) -> StoreResult<Vec<Genre>> {
        Ok(self
            .lock()
            .genres
            .values()
            .filter(|g| g.active)
            .cloned()
            .collect())
    }

    async fn find_genre(&self, id: DbId) -> StoreResult<Option<Genre>> {
        Ok(self.lock().genres.get(&id).filter(|g| g.active).cloned())
    }

    async fn search_genres(&self, prefix: &str, limit: i64) -> StoreResult<Vec<Genre>> {
        Ok(self
            .lock()
            .genres
            .values()
            .filter(|g| g.active && g.name.starts_with(prefix))
            .take(take(limit))
            .cloned()
            .collect())
    }

    async fn insert_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Rating> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .ratings
            .values()
            .find(|r| r.book_id == book_id && r.user_id == user_id)
        {
            return Ok(existing.clone());
        }

        let id = tables.next_id();
        let row = Rating {
            id,
            book_id,
            user_id,
            created_at: Utc::now(),
        };
        tables.ratings.insert(id, row.clone());
        Ok(row)
    }

    async fn find_rating(&self, book_id: DbId, user_id: DbId) -> StoreResult<Option<Rating>> {
        Ok(self
            .lock()
            .ratings
            .values()
            .find(|r| r.book_id == book_id && r.user_id == user_id)
            .cloned())
    }

    async fn find_rating_by_id(&self, id: DbId) -> StoreResult<Option<Rating>> {
        Ok(self.lock().ratings.get(&id).cloned())
    }

    async fn delete_rating(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.lock().ratings.remove(&id).is_some())
    }

    async fn count_ratings(&self, book_id: DbId) -> StoreResult<i64> {
        let count = self
            .lock()
            .ratings
            .values()
            .filter(|r| r.book_id == book_id)
            .count();
        Ok(count as i64)
    }
}
