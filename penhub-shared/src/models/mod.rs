/// Database models for PenHub
///
/// Each model owns the SQL for its table. The `db::postgres::PgStore` adapter
/// exposes them to the rest of the crate through the `Store` trait.
///
/// # Models
///
/// - `user`: accounts and stored credentials
/// - `token`: login token digests with expiry
/// - `book`: books (soft-deletable, public or private)
/// - `chapter`: chapters of a book (soft-deletable)
/// - `genre`: reference data
/// - `rating`: one like per (book, user)

use serde::{Deserialize, Serialize};

pub mod book;
pub mod chapter;
pub mod genre;
pub mod rating;
pub mod token;
pub mod user;

/// Primary key type of every table (BIGSERIAL)
pub type DbId = i64;

/// Owner lookup that ignores the soft-delete flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ownership {
    pub owner_id: DbId,
    pub active: bool,
}

/// Builds a `LIKE` pattern matching strings that start with `prefix`
///
/// `%`, `_` and the escape character itself are escaped so user input is
/// matched literally; queries use `ESCAPE '\'`.
pub fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
