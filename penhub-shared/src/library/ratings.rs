/// Likes
///
/// One like per (book, user). Liking twice hands back the first like; only
/// the user who left a like can remove it. Likes can only be placed on and
/// counted for books the caller can see.

use tracing::info;

use super::{Library, LibraryError, LibraryResult};
use crate::auth::authorization::require_ownership;
use crate::models::{rating::Rating, DbId};

impl Library {
    pub async fn like_book(&self, caller: DbId, book_id: DbId) -> LibraryResult<Rating> {
        self.get_book(caller, book_id).await?;

        let rating = self.store.insert_rating(book_id, caller).await?;
        info!(rating_id = rating.id, book_id, user_id = caller, "Liked book");
        Ok(rating)
    }

    /// Removes a like left by `caller`
    pub async fn unlike(&self, caller: DbId, rating_id: DbId) -> LibraryResult<()> {
        let rating = self
            .store
            .find_rating_by_id(rating_id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, rating.user_id)?;

        if !self.store.delete_rating(rating_id).await? {
            return Err(LibraryError::NotFound);
        }

        info!(rating_id, user_id = caller, "Removed like");
        Ok(())
    }

    /// The caller's like on a book, if any
    pub async fn my_like(&self, caller: DbId, book_id: DbId) -> LibraryResult<Option<Rating>> {
        self.get_book(caller, book_id).await?;
        Ok(self.store.find_rating(book_id, caller).await?)
    }

    pub async fn count_likes(&self, caller: DbId, book_id: DbId) -> LibraryResult<i64> {
        self.get_book(caller, book_id).await?;
        Ok(self.store.count_ratings(book_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::library::{books::BookDraft, PagingConfig};

    const ALICE: DbId = 100;
    const BOB: DbId = 200;

    async fn library_with_book() -> (Library, DbId) {
        let library = Library::new(Arc::new(MemoryStore::new()), PagingConfig::default());
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();
        (library, book.id)
    }

    #[tokio::test]
    async fn test_like_is_idempotent() {
        let (library, book) = library_with_book().await;

        let first = library.like_book(BOB, book).await.unwrap();
        let second = library.like_book(BOB, book).await.unwrap();
        assert_eq!(first.id, second.id);

        library.like_book(ALICE, book).await.unwrap();
        assert_eq!(library.count_likes(BOB, book).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_my_like() {
        let (library, book) = library_with_book().await;
        assert!(library.my_like(BOB, book).await.unwrap().is_none());

        let like = library.like_book(BOB, book).await.unwrap();
        assert_eq!(library.my_like(BOB, book).await.unwrap(), Some(like));
    }

    #[tokio::test]
    async fn test_unlike_is_owner_gated() {
        let (library, book) = library_with_book().await;
        let like = library.like_book(BOB, book).await.unwrap();

        assert!(matches!(
            library.unlike(ALICE, like.id).await,
            Err(LibraryError::Forbidden)
        ));
        assert_eq!(library.count_likes(ALICE, book).await.unwrap(), 1);

        library.unlike(BOB, like.id).await.unwrap();
        assert_eq!(library.count_likes(ALICE, book).await.unwrap(), 0);
        assert!(matches!(
            library.unlike(BOB, like.id).await,
            Err(LibraryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_cannot_like_invisible_book() {
        let (library, book) = library_with_book().await;
        library.set_book_active(ALICE, book, false).await.unwrap();

        assert!(matches!(
            library.like_book(BOB, book).await,
            Err(LibraryError::NotFound)
        ));
    }
}
