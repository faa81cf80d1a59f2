/// Chapter endpoints
///
/// # Endpoints
///
/// - `GET /v1/books/:id/chapters` - Table of contents
/// - `POST /v1/books/:id/chapters` - Write a chapter (book owner only)
/// - `GET /v1/chapters/:id` - Read a chapter
/// - `PATCH /v1/chapters/:id` - Edit (owner only)
/// - `PUT /v1/chapters/:id/active` - Soft delete or restore (owner only)

use crate::{app::AppState, error::ApiResult, routes::books::ActiveRequest};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use penhub_shared::{
    auth::middleware::AuthContext,
    library::chapters::ChapterDraft,
    models::{
        chapter::{Chapter, ChapterChanges, ChapterSummary},
        DbId,
    },
};

/// Chapters of a visible book ordered by number, without content
pub async fn list_chapters(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<DbId>,
) -> ApiResult<Json<Vec<ChapterSummary>>> {
    let chapters = state
        .deadline()
        .run(state.library.list_chapters(auth.user_id, book_id))
        .await??;

    Ok(Json(chapters))
}

pub async fn create_chapter(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<DbId>,
    Json(draft): Json<ChapterDraft>,
) -> ApiResult<(StatusCode, Json<Chapter>)> {
    let chapter = state
        .deadline()
        .run(state.library.create_chapter(auth.user_id, book_id, draft))
        .await??;

    Ok((StatusCode::CREATED, Json(chapter)))
}

pub async fn get_chapter(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<Chapter>> {
    let chapter = state
        .deadline()
        .run(state.library.get_chapter(auth.user_id, id))
        .await??;

    Ok(Json(chapter))
}

pub async fn update_chapter(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
    Json(changes): Json<ChapterChanges>,
) -> ApiResult<Json<Chapter>> {
    let chapter = state
        .deadline()
        .run(state.library.update_chapter(auth.user_id, id, changes))
        .await??;

    Ok(Json(chapter))
}

pub async fn set_chapter_active(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
    Json(req): Json<ActiveRequest>,
) -> ApiResult<StatusCode> {
    state
        .deadline()
        .run(state.library.set_chapter_active(auth.user_id, id, req.active))
        .await??;

    Ok(StatusCode::NO_CONTENT)
}
