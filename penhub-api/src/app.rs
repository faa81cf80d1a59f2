/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use penhub_api::{app::{build_router, AppState}, config::Config};
/// use penhub_shared::db::{pool::{create_pool, DatabaseConfig}, postgres::PgStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
///
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, routes};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use penhub_shared::{
    auth::{
        accounts::Accounts,
        middleware::{require_token, AuthGate},
        password::PasswordParams,
        token::TokenService,
    },
    db::{deadline::Deadline, store::Store},
    library::Library,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through Axum's `State` extractor; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub accounts: Accounts,
    pub library: Library,
    pub gate: AuthGate,

    /// Cancelled on shutdown; aborts in-flight request work
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self::with_password_params(store, config, PasswordParams::default())
    }

    /// State with explicit Argon2 cost for new password hashes
    pub fn with_password_params(
        store: Arc<dyn Store>,
        config: Config,
        params: PasswordParams,
    ) -> Self {
        let tokens = TokenService::new(store.clone(), config.token_ttl());
        let gate = AuthGate::new(tokens.clone(), config.request_timeout());
        let accounts = Accounts::new(store.clone(), tokens).with_password_params(params);
        let library = Library::new(store.clone(), config.paging());

        Self {
            store,
            config: Arc::new(config),
            accounts,
            library,
            gate,
            shutdown: CancellationToken::new(),
        }
    }

    /// Deadline for one request's service call
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.config.request_timeout())
            .with_cancellation(self.shutdown.child_token())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                       # Store ping (public)
/// └── /v1/
///     ├── /auth/                        # Public
///     │   ├── POST /register
///     │   └── POST /login
///     └── (token required)
///         ├── GET  /me/books
///         ├── POST /books
///         ├── GET|PATCH /books/:id
///         ├── PUT  /books/:id/active
///         ├── GET  /books/:id/ownership
///         ├── GET|POST /books/:id/chapters
///         ├── GET|POST /books/:id/likes
///         ├── GET  /books/:id/likes/mine
///         ├── GET|PATCH /chapters/:id
///         ├── PUT  /chapters/:id/active
///         ├── DELETE /likes/:id
///         ├── GET  /authors/:id/books
///         ├── GET  /genres, /genres/:id, /genres/:id/books
///         └── GET  /search/books, /search/authors, /search/genres
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Token gate on the protected group
pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/me/books", get(routes::books::my_books))
        .route("/books", post(routes::books::create_book))
        .route(
            "/books/:id",
            get(routes::books::get_book).patch(routes::books::update_book),
        )
        .route("/books/:id/active", put(routes::books::set_book_active))
        .route("/books/:id/ownership", get(routes::books::ownership))
        .route(
            "/books/:id/chapters",
            get(routes::chapters::list_chapters).post(routes::chapters::create_chapter),
        )
        .route(
            "/books/:id/likes",
            get(routes::ratings::count_likes).post(routes::ratings::like_book),
        )
        .route("/books/:id/likes/mine", get(routes::ratings::my_like))
        .route(
            "/chapters/:id",
            get(routes::chapters::get_chapter).patch(routes::chapters::update_chapter),
        )
        .route("/chapters/:id/active", put(routes::chapters::set_chapter_active))
        .route("/likes/:id", delete(routes::ratings::unlike))
        .route("/authors/:id/books", get(routes::books::author_books))
        .route("/genres", get(routes::genres::list_genres))
        .route("/genres/:id", get(routes::genres::get_genre))
        .route("/genres/:id/books", get(routes::genres::genre_books))
        .route("/search/books", get(routes::search::books_by_title))
        .route("/search/authors", get(routes::search::books_by_author))
        .route("/search/genres", get(routes::search::genres))
        .layer(axum::middleware::from_fn_with_state(
            state.gate.clone(),
            require_token,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
