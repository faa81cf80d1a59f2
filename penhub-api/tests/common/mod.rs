/// Common test utilities for integration tests
///
/// Builds the full router over `MemoryStore` with a cheap Argon2 cost, and
/// offers JSON request helpers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use penhub_api::app::{build_router, AppState};
use penhub_api::config::Config;
use penhub_shared::auth::password::PasswordParams;
use penhub_shared::db::memory::MemoryStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Test context holding the router and the store behind it
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Context with extra configuration variables
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let config = Config::from_lookup(move |key| {
            if key == "DATABASE_URL" {
                return Some("postgresql://unused/penhub_test".to_string());
            }
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("test config");

        let store = Arc::new(MemoryStore::new());
        let state =
            AppState::with_password_params(store.clone(), config, PasswordParams::new(256, 1, 1));
        let app = build_router(state.clone());

        TestContext { app, state, store }
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` when the body is empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(token), Some(body)).await
    }

    /// Registers an account and logs in, returning `(user_id, token)`
    pub async fn sign_up(&self, name: &str, login: &str, password: &str) -> (i64, String) {
        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/register",
                None,
                Some(json!({ "name": name, "login": login, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let user_id = body["user_id"].as_i64().unwrap();

        let (status, body) = self
            .send(
                "POST",
                "/v1/auth/login",
                None,
                Some(json!({ "login": login, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);

        (user_id, body["token"].as_str().unwrap().to_string())
    }

    /// Creates a public book in `genre_id` and returns its id
    pub async fn create_book(&self, token: &str, title: &str, genre_id: i64) -> i64 {
        let (status, body) = self
            .post("/v1/books", token, json!({ "title": title, "genre_id": genre_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "create book failed: {}", body);
        body["id"].as_i64().unwrap()
    }
}
