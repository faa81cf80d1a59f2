/// Books, chapters, genres and likes
///
/// [`Library`] is the service behind every content route. It applies the same
/// rules to each operation:
///
/// - reads and lists see only active rows, and private books only when the
///   caller wrote them; anything else is `NotFound`
/// - mutations run input validation, then the ownership lookup, then the
///   ownership check, then the write, and stop at the first failure
/// - deleting is a soft delete through the active flag; the owner can restore
/// - author and genre listings are keyset pages (see [`pagination`])
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use penhub_shared::db::memory::MemoryStore;
/// use penhub_shared::library::{books::BookDraft, Library, PagingConfig};
///
/// # async fn example() -> Result<(), penhub_shared::library::LibraryError> {
/// let library = Library::new(Arc::new(MemoryStore::new()), PagingConfig::default());
///
/// let book = library
///     .create_book(1, BookDraft::new("Dune", 2))
///     .await?;
/// assert!(library.authorize_ownership(1, book.id).await?);
/// assert!(!library.authorize_ownership(2, book.id).await?);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use crate::auth::authorization::NotOwner;
use crate::db::store::{Store, StoreError};

pub mod books;
pub mod catalog;
pub mod chapters;
pub mod pagination;
pub mod ratings;
pub mod validation;

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<NotOwner> for LibraryError {
    fn from(_: NotOwner) -> Self {
        LibraryError::Forbidden
    }
}

/// Result alias for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Page sizes and the search cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub author_page_size: i64,
    pub genre_page_size: i64,
    pub search_limit: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            author_page_size: 10,
            genre_page_size: 5,
            search_limit: 20,
        }
    }
}

#[derive(Clone)]
pub struct Library {
    store: Arc<dyn Store>,
    paging: PagingConfig,
}

impl Library {
    pub fn new(store: Arc<dyn Store>, paging: PagingConfig) -> Self {
        Self { store, paging }
    }
}
