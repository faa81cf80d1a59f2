/// Keyset pagination
///
/// A cursor is the id of the last row the client saw; `0` (or no cursor)
/// starts from the beginning. Pages hold rows with `id > cursor` in ascending
/// id order. `next_cursor` is set only when the page came back full, so a
/// short or empty page ends the listing.

use serde::Serialize;

use super::LibraryError;
use crate::models::DbId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<DbId>,
}

impl<T> Page<T> {
    /// Builds a page from rows fetched with `limit`
    pub fn from_rows(items: Vec<T>, limit: i64, id_of: impl Fn(&T) -> DbId) -> Self {
        let full = limit > 0 && items.len() as i64 >= limit;
        let next_cursor = if full { items.last().map(id_of) } else { None };

        Self { items, next_cursor }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Normalizes an optional client cursor; negative values are rejected
pub fn validate_cursor(cursor: Option<i64>) -> Result<DbId, LibraryError> {
    match cursor {
        None => Ok(0),
        Some(c) if c < 0 => Err(LibraryError::InvalidInput(
            "Cursor must not be negative".to_string(),
        )),
        Some(c) => Ok(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_page_has_next_cursor() {
        let page = Page::from_rows(vec![3, 5, 8], 3, |id| *id);
        assert_eq!(page.next_cursor, Some(8));
    }

    #[test]
    fn test_short_page_ends_listing() {
        let page = Page::from_rows(vec![3, 5], 3, |id| *id);
        assert_eq!(page.next_cursor, None);

        let empty: Page<i64> = Page::from_rows(vec![], 3, |id| *id);
        assert!(empty.is_empty());
        assert_eq!(empty.next_cursor, None);
    }

    #[test]
    fn test_validate_cursor() {
        assert_eq!(validate_cursor(None).unwrap(), 0);
        assert_eq!(validate_cursor(Some(42)).unwrap(), 42);
        assert!(matches!(
            validate_cursor(Some(-1)),
            Err(LibraryError::InvalidInput(_))
        ));
    }
}
