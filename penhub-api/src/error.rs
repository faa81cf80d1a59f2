/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`; the error side converts into a JSON
/// body `{"error": code, "message": text}` with the matching status code.
/// Internal details are logged and never sent to clients.
///
/// # Example
///
/// ```
/// use penhub_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(id: i64) -> ApiResult<Json<Value>> {
///     if id < 1 {
///         return Err(ApiError::BadRequest("id must be positive".to_string()));
///     }
///     Ok(Json(json!({ "id": id })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use penhub_shared::auth::{
    accounts::{LoginError, RegisterError},
    middleware::AuthError,
};
use penhub_shared::db::{deadline::DeadlineError, store::StoreError};
use penhub_shared::library::LibraryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used for every failed login, whichever credential was wrong
pub const INVALID_CREDENTIALS: &str = "Invalid login or password";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409), e.g. a taken login
    Conflict(String),

    /// Unprocessable entity (422) - field-level request validation
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503), including missed request deadlines
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| ValidationErrorDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}", field)),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl From<DeadlineError> for ApiError {
    fn from(err: DeadlineError) -> Self {
        tracing::warn!(error = %err, "Request deadline hit");
        ApiError::ServiceUnavailable("Request timed out".to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                tracing::warn!(constraint = %constraint, "Unique constraint violated");
                ApiError::Conflict("Conflict".to_string())
            }
            StoreError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing credentials".to_string())
            }
            AuthError::InvalidToken => ApiError::Unauthorized("Invalid token".to_string()),
            AuthError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            AuthError::Timeout => ApiError::ServiceUnavailable("Request timed out".to_string()),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::LoginTaken => ApiError::Conflict("Login already taken".to_string()),
            RegisterError::InvalidCredentialFormat(msg) => ApiError::BadRequest(msg),
            RegisterError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::NoSuchUser | LoginError::InvalidPassword => {
                ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
            }
            LoginError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::InvalidInput(msg) => ApiError::BadRequest(msg),
            LibraryError::Forbidden => ApiError::Forbidden("Forbidden".to_string()),
            LibraryError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            LibraryError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Book not found".to_string());
        assert_eq!(err.to_string(), "Not found: Book not found");
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let a = ApiError::from(LoginError::NoSuchUser);
        let b = ApiError::from(LoginError::InvalidPassword);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_library_error_status_codes() {
        let cases = [
            (LibraryError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (LibraryError::Forbidden, StatusCode::FORBIDDEN),
            (LibraryError::NotFound, StatusCode::NOT_FOUND),
            (
                LibraryError::Store(StoreError::Conflict("ratings_book_user_key".to_string())),
                StatusCode::CONFLICT,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_conflict_hides_constraint_name() {
        let err = ApiError::from(StoreError::Conflict("users_login_key".to_string()));
        assert!(!err.to_string().contains("users_login_key"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_deadline_maps_to_503() {
        let err = ApiError::from(DeadlineError::Elapsed);
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_register_errors() {
        assert_eq!(
            ApiError::from(RegisterError::LoginTaken).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(RegisterError::InvalidCredentialFormat("short".to_string()))
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }
}
