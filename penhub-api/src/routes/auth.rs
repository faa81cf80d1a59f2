/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Create an account
/// - `POST /v1/auth/login` - Exchange login and password for a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use penhub_shared::{
    auth::{accounts, password},
    models::DbId,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(min = 3, max = 64, message = "Login must be 3-64 characters"))]
    pub login: String,

    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: DbId,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Login is required"))]
    pub login: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub token: String,

    pub expires_at: DateTime<Utc>,
}

fn field_error(field: &str, message: String) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message,
    }])
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Alice",
///   "login": "alice",
///   "password": "secret1"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{"user_id": 1}`
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `409 Conflict`: Login already taken
/// - `503 Service Unavailable`: Request deadline hit
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    req.validate()?;

    // Character set rules the derive cannot express
    accounts::validate_login(&req.login).map_err(|e| field_error("login", e))?;
    password::validate_password_format(&req.password).map_err(|e| field_error("password", e))?;

    let user_id = state
        .deadline()
        .run(state.accounts.register(&req.name, &req.login, &req.password))
        .await??;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

/// Login with login and password
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "login": "alice",
///   "password": "secret1"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "9f86d0...",
///   "expires_at": "2024-01-02T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown login or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let issued = state
        .deadline()
        .run(state.accounts.login(&req.login, &req.password))
        .await??;

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            name: "Alice".to_string(),
            login: "alice".to_string(),
            password: "secret1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = RegisterRequest {
            name: String::new(),
            login: "al".to_string(),
            password: "123".to_string(),
        };
        let errors = short.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 3);
    }

    #[test]
    fn test_login_request_requires_fields() {
        let req = LoginRequest {
            login: String::new(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }
}
