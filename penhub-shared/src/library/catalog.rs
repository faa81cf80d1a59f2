/// Genres and prefix search
///
/// Searches are literal, case-sensitive prefix matches over active rows,
/// ordered by id and capped by the configured search limit.

use super::{validation::validate_query, Library, LibraryError, LibraryResult};
use crate::models::{book::Book, genre::Genre, DbId};

impl Library {
    pub async fn list_genres(&self) -> LibraryResult<Vec<Genre>> {
        Ok(self.store.list_genres().await?)
    }

    pub async fn get_genre(&self, id: DbId) -> LibraryResult<Genre> {
        self.store
            .find_genre(id)
            .await?
            .ok_or(LibraryError::NotFound)
    }

    pub async fn search_genres(&self, query: &str) -> LibraryResult<Vec<Genre>> {
        validate_query(query)?;
        Ok(self
            .store
            .search_genres(query, self.paging.search_limit)
            .await?)
    }

    /// Books whose title starts with `query`
    pub async fn search_books_by_title(&self, caller: DbId, query: &str) -> LibraryResult<Vec<Book>> {
        validate_query(query)?;
        Ok(self
            .store
            .search_books_by_title(query, caller, self.paging.search_limit)
            .await?)
    }

    /// Books whose author's name starts with `query`
    pub async fn search_books_by_author(
        &self,
        caller: DbId,
        query: &str,
    ) -> LibraryResult<Vec<Book>> {
        validate_query(query)?;
        Ok(self
            .store
            .search_books_by_author(query, caller, self.paging.search_limit)
            .await?)
    }
}
