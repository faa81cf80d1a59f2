/// API route handlers
///
/// Handlers are grouped by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `books`: Book lifecycle and listings
/// - `chapters`: Chapter lifecycle
/// - `genres`: Genre reference data
/// - `search`: Prefix search
/// - `ratings`: Likes

pub mod auth;
pub mod books;
pub mod chapters;
pub mod genres;
pub mod health;
pub mod ratings;
pub mod search;
