/// Chapter lifecycle
///
/// A chapter is readable while it and its book are active and the book is
/// visible to the caller. Writing requires an active book owned by the
/// caller, and editing also requires the chapter itself to be active. Toggling
/// the active flag only requires ownership so a deleted chapter can be
/// restored.

use serde::Deserialize;
use tracing::info;

use super::{
    validation::{validate_chapter_name, validate_chapter_number, validate_content},
    Library, LibraryError, LibraryResult,
};
use crate::auth::authorization::require_ownership;
use crate::models::{
    chapter::{Chapter, ChapterChanges, ChapterSummary, NewChapter},
    DbId,
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterDraft {
    pub number: i64,
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl ChapterDraft {
    fn validate(&self) -> LibraryResult<()> {
        validate_chapter_number(self.number)?;
        validate_chapter_name(&self.name)?;
        validate_content(&self.content)
    }
}

fn validate_changes(changes: &ChapterChanges) -> LibraryResult<()> {
    if changes.is_empty() {
        return Err(LibraryError::InvalidInput("Nothing to update".to_string()));
    }
    if let Some(number) = changes.number {
        validate_chapter_number(number)?;
    }
    if let Some(name) = &changes.name {
        validate_chapter_name(name)?;
    }
    if let Some(content) = &changes.content {
        validate_content(content)?;
    }
    Ok(())
}

impl Library {
    /// Adds a chapter to an active book owned by `caller`
    pub async fn create_chapter(
        &self,
        caller: DbId,
        book_id: DbId,
        draft: ChapterDraft,
    ) -> LibraryResult<Chapter> {
        draft.validate()?;

        let ownership = self
            .store
            .book_owner(book_id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, ownership.owner_id)?;
        if !ownership.active {
            return Err(LibraryError::NotFound);
        }

        let chapter = self
            .store
            .insert_chapter(NewChapter {
                book_id,
                number: draft.number,
                name: draft.name,
                content: draft.content,
            })
            .await?;

        info!(chapter_id = chapter.id, book_id, "Created chapter");
        Ok(chapter)
    }

    pub async fn get_chapter(&self, caller: DbId, id: DbId) -> LibraryResult<Chapter> {
        let chapter = self
            .store
            .find_chapter(id)
            .await?
            .ok_or(LibraryError::NotFound)?;

        // Parent must be active and visible too
        self.get_book(caller, chapter.book_id).await?;
        Ok(chapter)
    }

    /// Table of contents of a visible book, ordered by chapter number
    pub async fn list_chapters(
        &self,
        caller: DbId,
        book_id: DbId,
    ) -> LibraryResult<Vec<ChapterSummary>> {
        self.get_book(caller, book_id).await?;
        Ok(self.store.list_chapters(book_id).await?)
    }

    pub async fn update_chapter(
        &self,
        caller: DbId,
        id: DbId,
        changes: ChapterChanges,
    ) -> LibraryResult<Chapter> {
        validate_changes(&changes)?;

        let ownership = self
            .store
            .chapter_owner(id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, ownership.owner_id)?;
        if !ownership.active || !ownership.book_active {
            return Err(LibraryError::NotFound);
        }

        let chapter = self
            .store
            .update_chapter(id, changes)
            .await?
            .ok_or(LibraryError::NotFound)?;

        info!(chapter_id = id, book_id = ownership.book_id, "Updated chapter");
        Ok(chapter)
    }

    /// Soft-deletes (`false`) or restores (`true`) a chapter; idempotent
    pub async fn set_chapter_active(
        &self,
        caller: DbId,
        id: DbId,
        active: bool,
    ) -> LibraryResult<()> {
        let ownership = self
            .store
            .chapter_owner(id)
            .await?
            .ok_or(LibraryError::NotFound)?;
        require_ownership(caller, ownership.owner_id)?;

        if !self.store.set_chapter_active(id, active).await? {
            return Err(LibraryError::NotFound);
        }

        info!(chapter_id = id, active, "Changed chapter active flag");
        Ok(())
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

    fn draft(number: i64, name: &str) -> ChapterDraft {
        ChapterDraft {
            number,
            name: name.to_string(),
            content: format!("Text of {name}"),
        }
    }

    async fn library_with_book() -> (Library, DbId) {
        let library = Library::new(Arc::new(MemoryStore::new()), PagingConfig::default());
        let book = library.create_book(ALICE, BookDraft::new("Dune", 1)).await.unwrap();
        (library, book.id)
    }

    #[tokio::test]
    async fn test_chapters_listed_in_number_order() {
        let (library, book) = library_with_book().await;
        library.create_chapter(ALICE, book, draft(2, "Two")).await.unwrap();
        library.create_chapter(ALICE, book, draft(1, "One")).await.unwrap();

        let names: Vec<String> = library
            .list_chapters(BOB, book)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["One", "Two"]);
    }

    #[tokio::test]
    async fn test_create_chapter_requires_owner() {
        let (library, book) = library_with_book().await;

        let err = library.create_chapter(BOB, book, draft(1, "One")).await.unwrap_err();
        assert!(matches!(err, LibraryError::Forbidden));
        assert!(library.list_chapters(ALICE, book).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_chapter_validates_first() {
        let (library, book) = library_with_book().await;

        let err = library.create_chapter(BOB, book, draft(0, "Zero")).await.unwrap_err();
        assert!(matches!(err, LibraryError::InvalidInput(_)));

        let err = library.create_chapter(ALICE, 9999, draft(1, "One")).await.unwrap_err();
        assert!(matches!(err, LibraryError::NotFound));
    }

    #[tokio::test]
    async fn test_chapter_hidden_with_its_book() {
        let (library, book) = library_with_book().await;
        let chapter = library.create_chapter(ALICE, book, draft(1, "One")).await.unwrap();

        library.set_book_active(ALICE, book, false).await.unwrap();
        assert!(matches!(
            library.get_chapter(ALICE, chapter.id).await,
            Err(LibraryError::NotFound)
        ));
        assert!(matches!(
            library.create_chapter(ALICE, book, draft(2, "Two")).await,
            Err(LibraryError::NotFound)
        ));

        library.set_book_active(ALICE, book, true).await.unwrap();
        assert_eq!(library.get_chapter(BOB, chapter.id).await.unwrap(), chapter);
    }

    #[tokio::test]
    async fn test_chapter_soft_delete_and_restore() {
        let (library, book) = library_with_book().await;
        let chapter = library.create_chapter(ALICE, book, draft(1, "One")).await.unwrap();

        assert!(matches!(
            library.set_chapter_active(BOB, chapter.id, false).await,
            Err(LibraryError::Forbidden)
        ));

        library.set_chapter_active(ALICE, chapter.id, false).await.unwrap();
        assert!(library.list_chapters(ALICE, book).await.unwrap().is_empty());
        assert!(library.get_chapter(ALICE, chapter.id).await.is_err());

        library.set_chapter_active(ALICE, chapter.id, true).await.unwrap();
        assert_eq!(library.list_chapters(ALICE, book).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_chapter() {
        let (library, book) = library_with_book().await;
        let chapter = library.create_chapter(ALICE, book, draft(1, "One")).await.unwrap();

        let changes = ChapterChanges {
            name: Some("Prologue".to_string()),
            number: Some(3),
            ..Default::default()
        };
        assert!(matches!(
            library.update_chapter(BOB, chapter.id, changes.clone()).await,
            Err(LibraryError::Forbidden)
        ));

        let updated = library.update_chapter(ALICE, chapter.id, changes).await.unwrap();
        assert_eq!(updated.name, "Prologue");
        assert_eq!(updated.number, 3);
        assert_eq!(updated.content, chapter.content);
    }

    #[tokio::test]
    async fn test_deleted_chapter_cannot_be_edited() {
        let (library, book) = library_with_book().await;
        let chapter = library.create_chapter(ALICE, book, draft(1, "One")).await.unwrap();
        library.set_chapter_active(ALICE, chapter.id, false).await.unwrap();

        let changes = ChapterChanges {
            name: Some("Edited".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            library.update_chapter(ALICE, chapter.id, changes.clone()).await,
            Err(LibraryError::NotFound)
        ));

        // Non-owners still see the ownership failure first
        assert!(matches!(
            library.update_chapter(BOB, chapter.id, changes.clone()).await,
            Err(LibraryError::Forbidden)
        ));

        library.set_chapter_active(ALICE, chapter.id, true).await.unwrap();
        assert_eq!(library.get_chapter(ALICE, chapter.id).await.unwrap().name, "One");
        let updated = library.update_chapter(ALICE, chapter.id, changes).await.unwrap();
        assert_eq!(updated.name, "Edited");
    }

    #[tokio::test]
    async fn test_chapters_of_private_book_hidden_from_others() {
        let library = Library::new(Arc::new(MemoryStore::new()), PagingConfig::default());
        let book = library
            .create_book(ALICE, BookDraft::new("Diary", 1).private())
            .await
            .unwrap();
        let chapter = library.create_chapter(ALICE, book.id, draft(1, "Monday")).await.unwrap();

        assert!(matches!(
            library.get_chapter(BOB, chapter.id).await,
            Err(LibraryError::NotFound)
        ));
        assert!(matches!(
            library.list_chapters(BOB, book.id).await,
            Err(LibraryError::NotFound)
        ));

        assert_eq!(library.get_chapter(ALICE, chapter.id).await.unwrap(), chapter);
        assert_eq!(library.list_chapters(ALICE, book.id).await.unwrap().len(), 1);
    }
}
