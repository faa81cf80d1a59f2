/// Like endpoints
///
/// A user holds at most one like per book. Liking twice returns the existing
/// like.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use penhub_shared::{
    auth::middleware::AuthContext,
    models::{rating::Rating, DbId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeCountResponse {
    pub book_id: DbId,
    pub likes: i64,
}

/// The caller's like on a book; `like_id` is null when there is none
#[derive(Debug, Serialize, Deserialize)]
pub struct MyLikeResponse {
    pub like_id: Option<DbId>,
}

pub async fn count_likes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<DbId>,
) -> ApiResult<Json<LikeCountResponse>> {
    let likes = state
        .deadline()
        .run(state.library.count_likes(auth.user_id, book_id))
        .await??;

    Ok(Json(LikeCountResponse { book_id, likes }))
}

pub async fn like_book(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<DbId>,
) -> ApiResult<Json<Rating>> {
    let rating = state
        .deadline()
        .run(state.library.like_book(auth.user_id, book_id))
        .await??;

    Ok(Json(rating))
}

pub async fn my_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(book_id): Path<DbId>,
) -> ApiResult<Json<MyLikeResponse>> {
    let rating = state
        .deadline()
        .run(state.library.my_like(auth.user_id, book_id))
        .await??;

    Ok(Json(MyLikeResponse {
        like_id: rating.map(|r| r.id),
    }))
}

/// Removes a like; only the user who liked may remove it
pub async fn unlike(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<DbId>,
) -> ApiResult<StatusCode> {
    state
        .deadline()
        .run(state.library.unlike(auth.user_id, id))
        .await??;

    Ok(StatusCode::NO_CONTENT)
}
