/// Account registration and login
///
/// Registration validates the credential format, hashes the password on the
/// blocking pool and stores the user. The login pre-check gives a clean
/// `LoginTaken`; the `users_login_key` constraint still decides races between
/// concurrent registrations.
///
/// Login verifies the pair and issues a token through [`TokenService`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use penhub_shared::auth::{accounts::Accounts, password::PasswordParams, token::TokenService};
/// use penhub_shared::db::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let tokens = TokenService::new(store.clone(), chrono::Duration::hours(24));
/// let accounts = Accounts::new(store, tokens).with_password_params(PasswordParams::new(256, 1, 1));
///
/// let alice = accounts.register("Alice", "alice", "secret1").await?;
/// let issued = accounts.login("alice", "secret1").await?;
/// assert_eq!(issued.user_id, alice);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::{error, info};

use super::{
    credentials::{CredentialError, CredentialVerifier},
    password::{hash_password_with, validate_password_format, PasswordError, PasswordParams},
    token::{IssuedToken, TokenError, TokenService},
};
use crate::db::store::{Store, StoreError};
use crate::models::{user::NewUser, DbId};

pub const MIN_LOGIN_LEN: usize = 3;
pub const MAX_LOGIN_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("Login already taken")]
    LoginTaken,

    #[error("{0}")]
    InvalidCredentialFormat(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("No such user")]
    NoSuchUser,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for RegisterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => RegisterError::LoginTaken,
            other => RegisterError::Internal(other.to_string()),
        }
    }
}

impl From<PasswordError> for RegisterError {
    fn from(err: PasswordError) -> Self {
        RegisterError::Internal(err.to_string())
    }
}

impl From<CredentialError> for LoginError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::NoSuchUser => LoginError::NoSuchUser,
            CredentialError::InvalidPassword => LoginError::InvalidPassword,
            other => LoginError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for LoginError {
    fn from(err: TokenError) -> Self {
        LoginError::Internal(err.to_string())
    }
}

/// Login: 3 to 64 characters from `[A-Za-z0-9_.-]`
pub fn validate_login(login: &str) -> Result<(), String> {
    if login.len() < MIN_LOGIN_LEN || login.len() > MAX_LOGIN_LEN {
        return Err(format!(
            "Login must be between {} and {} characters",
            MIN_LOGIN_LEN, MAX_LOGIN_LEN
        ));
    }

    if !login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("Login may only contain letters, digits, '_', '.' and '-'".to_string());
    }

    Ok(())
}

/// Display name: 1 to 100 characters, not blank
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name must not be empty".to_string());
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Name must be at most {} characters", MAX_NAME_LEN));
    }

    Ok(())
}

#[derive(Clone)]
pub struct Accounts {
    store: Arc<dyn Store>,
    verifier: CredentialVerifier,
    tokens: TokenService,
    params: PasswordParams,
}

impl Accounts {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            verifier: CredentialVerifier::new(store.clone()),
            store,
            tokens,
            params: PasswordParams::default(),
        }
    }

    /// Overrides the Argon2 cost used for new hashes and for the decoy hash
    /// checked on unknown logins
    pub fn with_password_params(mut self, params: PasswordParams) -> Self {
        self.params = params;
        self.verifier = self.verifier.with_password_params(params);
        self
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and returns its id
    ///
    /// # Errors
    ///
    /// - `InvalidCredentialFormat` when name, login or password fail validation
    /// - `LoginTaken` when the login exists (checked before hashing and again
    ///   by the unique constraint)
    /// - `Internal` for hashing or store failures
    pub async fn register(
        &self,
        name: &str,
        login: &str,
        password: &str,
    ) -> Result<DbId, RegisterError> {
        validate_name(name).map_err(RegisterError::InvalidCredentialFormat)?;
        validate_login(login).map_err(RegisterError::InvalidCredentialFormat)?;
        validate_password_format(password).map_err(RegisterError::InvalidCredentialFormat)?;

        if self.store.login_exists(login).await? {
            return Err(RegisterError::LoginTaken);
        }

        let params = self.params;
        let password = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password_with(&password, &params))
                .await
                .map_err(|e| {
                    error!(error = %e, "Password hashing task failed");
                    RegisterError::Internal(e.to_string())
                })??;

        let user = self
            .store
            .insert_user(NewUser {
                name: name.to_string(),
                login: login.to_string(),
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "Registered user");
        Ok(user.id)
    }

    /// Verifies the credentials and issues a token with the default TTL
    ///
    /// # Errors
    ///
    /// `NoSuchUser` / `InvalidPassword` for bad credentials, `Internal`
    /// otherwise
    pub async fn login(&self, login: &str, password: &str) -> Result<IssuedToken, LoginError> {
        let user_id = self.verifier.verify(login, password).await?;
        let issued = self.tokens.issue(user_id).await?;

        info!(user_id, "User logged in");
        Ok(issued)
    }
}
