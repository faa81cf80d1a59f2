/// Token authentication for Axum
///
/// [`AuthGate`] resolves the `Authorization` header to a user id. The
/// [`require_token`] middleware runs it before protected handlers and inserts
/// an [`AuthContext`] into the request extensions; on failure the handler
/// never runs.
///
/// Both `Authorization: Bearer <token>` and a bare `Authorization: <token>`
/// are accepted.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use penhub_shared::auth::middleware::{require_token, AuthContext, AuthGate};
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
///
/// fn router(gate: AuthGate) -> Router {
///     Router::new()
///         .route("/whoami", get(whoami))
///         .layer(middleware::from_fn_with_state(gate, require_token))
/// }
/// ```

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};

use super::token::{TokenError, TokenService};
use crate::db::deadline::Deadline;
use crate::models::DbId;

/// Authenticated caller, available to handlers via `Extension<AuthContext>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: DbId,
}

/// Error type for token authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Authentication timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::NoAuthorization => AuthError::InvalidToken,
            TokenError::Expired => AuthError::Expired,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "unauthorized", "Missing credentials")
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "unauthorized", "Invalid token"),
            AuthError::Expired => (StatusCode::UNAUTHORIZED, "unauthorized", "Token expired"),
            AuthError::Timeout => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "Request timed out",
            ),
            AuthError::Internal(msg) => {
                error!(error = %msg, "Authentication failed internally");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred",
                )
            }
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the token from an `Authorization` header value
pub fn parse_authorization(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[derive(Clone)]
pub struct AuthGate {
    tokens: TokenService,
    timeout: Duration,
}

impl AuthGate {
    /// `timeout` bounds each token lookup
    pub fn new(tokens: TokenService, timeout: Duration) -> Self {
        Self { tokens, timeout }
    }

    /// Resolves an `Authorization` header value to a user id
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` when the header is absent or empty
    /// - `InvalidToken` for unknown or malformed tokens
    /// - `Expired` for tokens past their expiry
    /// - `Timeout` when the lookup misses its deadline
    /// - `Internal` for store failures
    pub async fn authenticate(&self, header: Option<&str>) -> Result<DbId, AuthError> {
        let token = header
            .and_then(parse_authorization)
            .ok_or(AuthError::MissingCredentials)?;

        let user_id = Deadline::after(self.timeout)
            .run(self.tokens.resolve(token))
            .await
            .map_err(|_| {
                warn!("Token lookup missed its deadline");
                AuthError::Timeout
            })??;

        debug!(user_id, "Authenticated request");
        Ok(user_id)
    }
}

/// Middleware rejecting requests without a valid token
///
/// Use with `axum::middleware::from_fn_with_state(gate, require_token)`.
pub async fn require_token(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user_id = gate.authenticate(value).await?;
    req.extensions_mut().insert(AuthContext { user_id });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use std::sync::Arc;

    fn gate() -> AuthGate {
        let tokens = TokenService::new(Arc::new(MemoryStore::new()), chrono::Duration::hours(1));
        AuthGate::new(tokens, Duration::from_secs(5))
    }

    #[test]
    fn test_parse_authorization() {
        assert_eq!(parse_authorization("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization("abc"), Some("abc"));
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization(""), None);
    }

    #[tokio::test]
    async fn test_authenticate_bearer_and_bare() {
        let gate = gate();
        let issued = gate.tokens.issue(9).await.unwrap();

        let bearer = format!("Bearer {}", issued.token);
        assert_eq!(gate.authenticate(Some(&bearer)).await.unwrap(), 9);
        assert_eq!(gate.authenticate(Some(&issued.token)).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn test_authenticate_failures() {
        let gate = gate();

        assert!(matches!(
            gate.authenticate(None).await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            gate.authenticate(Some("Bearer garbage")).await,
            Err(AuthError::InvalidToken)
        ));

        let expired = gate
            .tokens
            .issue_with_ttl(9, chrono::Duration::seconds(-5))
            .await
            .unwrap();
        assert!(matches!(
            gate.authenticate(Some(&expired.token)).await,
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            AuthError::MissingCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Expired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Timeout.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Internal("db down".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
