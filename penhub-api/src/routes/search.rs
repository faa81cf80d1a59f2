/// Prefix search endpoints
///
/// Matching is case-sensitive and literal; wildcard characters in the query
/// match themselves. A missing or empty query answers 400.
///
/// # Endpoints
///
/// - `GET /v1/search/books?title=` - Books whose title starts with `title`
/// - `GET /v1/search/authors?name=` - Books whose author's name starts with `name`
/// - `GET /v1/search/genres?name=` - Genres whose name starts with `name`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use penhub_shared::{
    auth::middleware::AuthContext,
    models::{book::Book, genre::Genre},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}

pub async fn books_by_title(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TitleQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .deadline()
        .run(state.library.search_books_by_title(auth.user_id, &query.title))
        .await??;

    Ok(Json(books))
}

pub async fn books_by_author(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Vec<Book>>> {
    let books = state
        .deadline()
        .run(state.library.search_books_by_author(auth.user_id, &query.name))
        .await??;

    Ok(Json(books))
}

pub async fn genres(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Vec<Genre>>> {
    let genres = state
        .deadline()
        .run(state.library.search_genres(&query.name))
        .await??;

    Ok(Json(genres))
}
