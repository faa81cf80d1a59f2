/// Genre endpoints
///
/// # Endpoints
///
/// - `GET /v1/genres` - All active genres
/// - `GET /v1/genres/:id` - One genre
/// - `GET /v1/genres/:id/books?last_id=` - A genre's visible books

use crate::{app::AppState, error::ApiResult, routes::books::PageQuery};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use penhub_shared::{
    auth::middleware::AuthContext,
    library::pagination::Page,
    models::{book::Book, genre::Genre, DbId},
};

pub async fn list_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    let genres = state.deadline().run(state.library.list_genres()).await??;
    Ok(Json(genres))
}

pub async fn get_genre(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> ApiResult<Json<Genre>> {
    let genre = state.deadline().run(state.library.get_genre(id)).await??;
    Ok(Json(genre))
}

pub async fn genre_books(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(genre_id): Path<DbId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Page<Book>>> {
    let page = state
        .deadline()
        .run(
            state
                .library
                .list_books_by_genre(auth.user_id, genre_id, page.last_id),
        )
        .await??;

    Ok(Json(page))
}
