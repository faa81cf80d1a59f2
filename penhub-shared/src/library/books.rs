/// Book lifecycle: create, read, edit, soft delete, listings

use serde::Deserialize;
use tracing::info;

use super::{
    pagination::{validate_cursor, Page},
    validation::{validate_cover_image, validate_description, validate_id, validate_title},
    Library, LibraryError, LibraryResult,
};
use crate::auth::authorization::{can_mutate, require_ownership};
use crate::models::{
    book::{Book, BookChanges, NewBook},
    DbId,
};

/// Caller-supplied fields of a new book
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub genre_id: DbId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default = "public")]
    pub access_read: bool,
}

fn public() -> bool {
    true
}

impl BookDraft {
    /// Public book with no description or cover
    pub fn new(title: impl Into<String>, genre_id: DbId) -> Self {
        Self {
            title: title.into(),
            genre_id,
            description: String::new(),
            cover_image: None,
            access_read: true,
        }
    }

    pub fn private(mut self) -> Self {
        self.access_read = false;
        self
    }

    fn validate(&self) -> LibraryResult<()> {
        validate_title(&self.title)?;
        validate_id("Genre", self.genre_id)?;
        validate_description(&self.description)?;
        if let Some(cover) = &self.cover_image {
            validate_cover_image(cover)?;
        }
        Ok(())
    }
}

fn validate_changes(changes: &BookChanges) -> LibraryResult<()> {
    if changes.is_empty() {
        return Err(LibraryError::InvalidInput("Nothing to update".to_string()));
    }
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }
    if let Some(description) = &changes.description {
        validate_description(description)?;
    }
    if let Some(genre_id) = changes.genre_id {
        validate_id("Genre", genre_id)?;
    }
    if let Some(cover) = &changes.cover_image {
        validate_cover_image(cover)?;
    }
    Ok(())
}

impl Library {
    async fn require_genre(&self, genre_id: DbId) -> LibraryResult<()> {
        if self.store.find_genre(genre_id).await?.is_none() {
            return Err(LibraryError::InvalidInput(format!(
                "Unknown genre {genre_id}"
            )));
        }
        Ok(())
    }

    /// Creates a book authored by `caller`
    pub async fn create_book(&self, caller: DbId, draft: BookDraft) -> LibraryResult<Book> {
        draft.validate()?;
        self.require_genre(draft.genre_id).await?;

        let book = self
            .store
            .insert_book(NewBook {
                title: draft.title,
                author_id: caller,
                genre_id: draft.genre_id,
                description: draft.description,
                cover_image: draft.cover_image,
                access_read: draft.access_read,
            })
            .await?;

        info!(book_id = book.id, author_id = caller, "Created book");
        Ok(book)
    }

    /// Active book visible to `caller`
    pub async fn get_book(&self, caller: DbId, id: DbId) -> LibraryResult<Book> {
        self.store
            .find_book(id, caller)
            .await?
            .ok_or(LibraryError::NotFound)
    }

    /// Whether `caller` may mutate book `book_id`
    ///
    /// # Errors
    ///
    /// `NotFound` when the book does not exist at all
    pub async fn authorize_ownership(&self, caller: DbId, book_id: DbId) -> LibraryResult<bool> {
        let ownership = self
            .store
            .book_owner(book_id)
            .await?
            .ok_or(LibraryError::NotFound)?;

        Ok(can_mutate(caller, ownership.owner_id))
    }

    /// Applies a partial edit to an active book owned by `caller`
    pub async fn update_book(
        &self,
        caller: DbId,
        id: DbId,
        changes: BookChanges,
    ) -> LibraryResult<Book> {
        validate_changes(&changes)?;

        let ownership = self
            .store
            .book_owner(id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, ownership.owner_id)?;
        if !ownership.active {
            return Err(LibraryError::NotFound);
        }

        if let Some(genre_id) = changes.genre_id {
            self.require_genre(genre_id).await?;
        }

        let book = self
            .store
            .update_book(id, changes)
            .await?
            .ok_or(LibraryError::NotFound)?;

        info!(book_id = id, author_id = caller, "Updated book");
        Ok(book)
    }

    /// Soft-deletes (`false`) or restores (`true`) a book; idempotent
    pub async fn set_book_active(&self, caller: DbId, id: DbId, active: bool) -> LibraryResult<()> {
        let ownership = self
            .store
            .book_owner(id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, ownership.owner_id)?;

        if !self.store.set_book_active(id, active).await? {
            return Err(LibraryError::NotFound);
        }

        info!(book_id = id, active, "Changed book active flag");
        Ok(())
    }

    /// Page of `author_id`'s books as seen by `caller`
    pub async fn list_books_by_author(
        &self,
        caller: DbId,
        author_id: DbId,
        cursor: Option<i64>,
    ) -> LibraryResult<Page<Book>> {
        let after = validate_cursor(cursor)?;
        let limit = self.paging.author_page_size;

        let books = self
            .store
            .list_books_by_author(author_id, caller, after, limit)
            .await?;

        Ok(Page::from_rows(books, limit, |b| b.id))
    }

    /// The caller's own books, private ones included
    pub async fn list_my_books(&self, caller: DbId, cursor: Option<i64>) -> LibraryResult<Page<Book>> {
        self.list_books_by_author(caller, caller, cursor).await
    }

    /// Page of a genre's books as seen by `caller`
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown or inactive genre
    pub async fn list_books_by_genre(
        &self,
        caller: DbId,
        genre_id: DbId,
        cursor: Option<i64>,
    ) -> LibraryResult<Page<Book>> {
        let after = validate_cursor(cursor)?;
        if self.store.find_genre(genre_id).await?.is_none() {
            return Err(LibraryError::NotFound);
        }

        let limit = self.paging.genre_page_size;
        let books = self
            .store
            .list_books_by_genre(genre_id, caller, after, limit)
            .await?;

        Ok(Page::from_rows(books, limit, |b| b.id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{memory::MemoryStore, store::Store};
    use crate::library::PagingConfig;

    const ALICE: DbId = 100;
    const BOB: DbId = 200;

    fn library() -> (Library, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let paging = PagingConfig {
            author_page_size: 2,
            genre_page_size: 2,
            search_limit: 20,
        };
        (Library::new(store.clone(), paging), store)
    }

    #[tokio::test]
    async fn test_create_and_get_book() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 2)).await.unwrap();

        assert_eq!(book.author_id, ALICE);
        assert!(book.active);
        assert_eq!(library.get_book(BOB, book.id).await.unwrap(), book);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_genre_and_bad_title() {
        let (library, _) = library();

        let err = library.create_book(ALICE, BookDraft::new("Dune", 999)).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));

        let err = library.create_book(ALICE, BookDraft::new("", 1)).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_private_book_is_not_found_for_others() {
        let (library, _) = library();
        let book = library
            .create_book(ALICE, BookDraft::new("Diary", 1).private())
            .await
            .unwrap();

        assert!(library.get_book(ALICE, book.id).await.is_ok());
        assert!(matches!(
            library.get_book(BOB, book.id).await,
            Err(LibraryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_authorize_ownership() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        assert!(library.authorize_ownership(ALICE, book.id).await.unwrap());
        assert!(!library.authorize_ownership(BOB, book.id).await.unwrap());
        assert!(matches!(
            library.authorize_ownership(ALICE, 9999).await,
            Err(LibraryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_requires_owner_and_leaves_book_untouched() {
        let (library, store) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        let changes = BookChanges {
            title: Some("Stolen".to_string()),
            ..Default::default()
        };
        let err = library.update_book(BOB, book.id, changes).await.unwrap_err();
        assert!(matches!(err, LibraryError::Forbidden));

        let stored = store.find_book(book.id, ALICE).await.unwrap().unwrap();
        assert_eq!(stored.title, "Dune");
    }

    #[tokio::test]
    async fn test_update_validates_before_ownership() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        let changes = BookChanges {
            title: Some(String::new()),
            ..Default::default()
        };
        let err = library.update_book(BOB, book.id, changes).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));

        let err = library
            .update_book(ALICE, book.id, BookChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_by_owner() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        let changes = BookChanges {
            access_read: Some(false),
            cover_image: Some("dune.png".to_string()),
            genre_id: Some(2),
            ..Default::default()
        };
        let updated = library.update_book(ALICE, book.id, changes).await.unwrap();

        assert!(!updated.access_read);
        assert_eq!(updated.cover_image.as_deref(), Some("dune.png"));
        assert_eq!(updated.genre_id, 2);
        assert_eq!(updated.title, "Dune");
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        library.set_book_active(ALICE, book.id, false).await.unwrap();
        library.set_book_active(ALICE, book.id, false).await.unwrap();
        assert!(matches!(
            library.get_book(ALICE, book.id).await,
            Err(LibraryError::NotFound)
        ));
        assert!(library.list_my_books(ALICE, None).await.unwrap().is_empty());

        library.set_book_active(ALICE, book.id, true).await.unwrap();
        assert_eq!(library.get_book(ALICE, book.id).await.unwrap(), book);
    }

    #[tokio::test]
    async fn test_soft_delete_forbidden_for_others() {
        let (library, _) = library();
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();

        let err = library.set_book_active(BOB, book.id, false).await.unwrap_err();
        assert!(matches!(err, LibraryError::Forbidden));
        assert!(library.get_book(BOB, book.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_author_paging_visits_each_book_once() {
        let (library, _) = library();
        let mut created = Vec::new();
        for i in 0..5 {
            let book = library
                .create_book(ALICE, BookDraft::new(format!("Book {i}"), 1))
                .await
                .unwrap();
            created.push(book.id);
        }

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = library.list_books_by_author(BOB, ALICE, cursor).await.unwrap();
            seen.extend(page.items.iter().map(|b| b.id));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        assert_eq!(seen, created);
    }

    #[tokio::test]
    async fn test_negative_cursor_rejected() {
        let (library, _) = library();
        let err = library.list_my_books(ALICE, Some(-5)).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_genre_listing() {
        let (library, _) = library();
        library.create_book(ALICE, BookDraft::new("A", 3)).await.unwrap();
        library.create_book(ALICE, BookDraft::new("B", 4)).await.unwrap();

        let page = library.list_books_by_genre(BOB, 3, None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_cursor, None);

        assert!(matches!(
            library.list_books_by_genre(BOB, 999, None).await,
            Err(LibraryError::NotFound)
        ));
    }
}
