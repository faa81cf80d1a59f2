/// Book endpoints
///
/// # Endpoints
///
/// - `POST /v1/books` - Create a book owned by the caller
/// - `GET /v1/books/:id` - Read a visible book
/// - `PATCH /v1/books/:id` - Edit (owner only)
/// - `PUT /v1/books/:id/active` - Soft delete or restore (owner only)
/// - `GET /v1/books/:id/ownership` - Whether the caller owns the book
/// - `GET /v1/me/books?last_id=` - The caller's books
/// - `GET /v1/authors/:id/books?last_id=` - An author's visible books

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use penhub_shared::{
    auth::middleware::AuthContext,
    library::{books::BookDraft, pagination::Page},
    models::{
        book::{Book, BookChanges},
        DbId,
    },
};
use serde::{Deserialize, Serialize};

/// Keyset cursor shared by every paged listing
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Id of the last row of the previous page
    pub last_id: Option<i64>,
}

/// Body of the `active` toggles
#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnershipResponse {
    pub owner: bool,
}

pub async fn create_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(draft): Json<BookDraft>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = state
        .deadline()
        .run(state.library.create_book(auth.user_id, draft))
        .await??;

    Ok((StatusCode::CREATED, Json(book)))
}

/// Reads a book; private books of other authors answer 404
pub async fn get_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<Book>> {
    let book = state
        .deadline()
        .run(state.library.get_book(auth.user_id, id))
        .await??;

    Ok(Json(book))
}

/// Partial edit
///
/// # Errors
///
/// - `400 Bad Request`: Empty or invalid change set
/// - `403 Forbidden`: Caller is not the author
/// - `404 Not Found`: Unknown or deleted book
pub async fn update_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
    Json(changes): Json<BookChanges>,
) -> ApiResult<Json<Book>> {
    let book = state
        .deadline()
        .run(state.library.update_book(auth.user_id, id, changes))
        .await??;

    Ok(Json(book))
}

/// Soft delete (`{"active": false}`) or restore (`{"active": true}`)
pub async fn set_book_active(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
    Json(req): Json<ActiveRequest>,
) -> ApiResult<StatusCode> {
    state
        .deadline()
        .run(state.library.set_book_active(auth.user_id, id, req.active))
        .await??;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn ownership(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<OwnershipResponse>> {
    let owner = state
        .deadline()
        .run(state.library.authorize_ownership(auth.user_id, id))
        .await??;

    Ok(Json(OwnershipResponse { owner }))
}

/// The caller's books, private ones included
pub async fn my_books(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Page<Book>>> {
    let page = state
        .deadline()
        .run(state.library.list_my_books(auth.user_id, page.last_id))
        .await??;

    Ok(Json(page))
}

pub async fn author_books(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(author_id): Path<DbId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Page<Book>>> {
    let page = state
        .deadline()
        .run(
            state
                .library
                .list_books_by_author(auth.user_id, author_id, page.last_id),
        )
        .await??;

    Ok(Json(page))
}
