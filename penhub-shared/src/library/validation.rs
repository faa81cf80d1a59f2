/// Field rules for books, chapters and search queries

use super::LibraryError;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_COVER_LEN: usize = 255;
pub const MAX_CHAPTER_NAME_LEN: usize = 200;

/// Chapter bodies are capped at 1 MB
pub const MAX_CONTENT_BYTES: usize = 1024 * 1024;

fn invalid(message: impl Into<String>) -> LibraryError {
    LibraryError::InvalidInput(message.into())
}

fn non_blank(field: &str, value: &str, max_chars: usize) -> Result<(), LibraryError> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} must not be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(invalid(format!("{field} must be at most {max_chars} characters")));
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), LibraryError> {
    non_blank("Title", title, MAX_TITLE_LEN)
}

pub fn validate_description(description: &str) -> Result<(), LibraryError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(invalid(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// Cover references are bare file names
pub fn validate_cover_image(cover: &str) -> Result<(), LibraryError> {
    non_blank("Cover image", cover, MAX_COVER_LEN)?;
    if cover.contains(['/', '\\']) || cover == "." || cover == ".." {
        return Err(invalid("Cover image must be a file name without path separators"));
    }
    Ok(())
}

pub fn validate_chapter_name(name: &str) -> Result<(), LibraryError> {
    non_blank("Chapter name", name, MAX_CHAPTER_NAME_LEN)
}

pub fn validate_chapter_number(number: i64) -> Result<(), LibraryError> {
    if number < 1 {
        return Err(invalid("Chapter number must be at least 1"));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), LibraryError> {
    if content.len() > MAX_CONTENT_BYTES {
        return Err(invalid("Chapter content must be at most 1 MB"));
    }
    Ok(())
}

pub fn validate_id(field: &str, id: i64) -> Result<(), LibraryError> {
    if id < 1 {
        return Err(invalid(format!("{field} must be a positive id")));
    }
    Ok(())
}

/// Search queries must not be empty
pub fn validate_query(query: &str) -> Result<(), LibraryError> {
    if query.is_empty() {
        return Err(invalid("Search query must not be empty"));
    }
    Ok(())
}
