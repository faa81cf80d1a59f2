/// Opaque login tokens
///
/// A token is 32 bytes from the OS RNG, hex-encoded to 64 characters and
/// handed to the client once. Only its SHA-256 digest is persisted, together
/// with the user id and an absolute expiry.
///
/// # Lifecycle
///
/// `Issued -> Expired`. There is no revocation; an expired row just stops
/// resolving. A token is expired iff `now > expires_at`, so a token checked at
/// exactly its expiry instant is still valid.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use penhub_shared::auth::token::TokenService;
/// use penhub_shared::db::memory::MemoryStore;
///
/// # async fn example() -> Result<(), penhub_shared::auth::token::TokenError> {
/// let tokens = TokenService::new(Arc::new(MemoryStore::new()), chrono::Duration::hours(24));
///
/// let issued = tokens.issue(7).await?;
/// assert_eq!(tokens.resolve(&issued.token).await?, 7);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::db::store::{Store, StoreError};
use crate::models::{token::NewToken, DbId};

/// Random bytes per token
pub const TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded token
pub const TOKEN_HEX_LEN: usize = TOKEN_BYTES * 2;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Malformed token or no matching row
    #[error("No authorization")]
    NoAuthorization,

    #[error("Token expired")]
    Expired,

    #[error("Random source failure: {0}")]
    RandomSource(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly minted token; the plaintext exists only here
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub user_id: DbId,
    pub expires_at: DateTime<Utc>,
}

/// Generates a new random token
///
/// # Errors
///
/// `TokenError::RandomSource` when the OS RNG is unavailable
pub fn generate_token() -> Result<String, TokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| TokenError::RandomSource(e.to_string()))?;

    Ok(hex::encode(bytes))
}

/// Hex SHA-256 digest used as the stored lookup key
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// True when `token` has the shape of an issued token (64 lowercase hex chars)
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_HEX_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > expires_at
}

#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn Store>,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(store: Arc<dyn Store>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// Issues a token valid for the configured TTL
    pub async fn issue(&self, user_id: DbId) -> Result<IssuedToken, TokenError> {
        self.issue_with_ttl(user_id, self.default_ttl).await
    }

    /// Issues a token valid for `ttl`; a negative `ttl` mints an expired token
    ///
    /// # Errors
    ///
    /// `RandomSource` or `Store` on failure; nothing is persisted in either case
    pub async fn issue_with_ttl(
        &self,
        user_id: DbId,
        ttl: Duration,
    ) -> Result<IssuedToken, TokenError> {
        let token = generate_token()?;
        let expires_at = Utc::now() + ttl;

        self.store
            .insert_token(NewToken {
                token_hash: hash_token(&token),
                user_id,
                expires_at,
            })
            .await?;

        debug!(user_id, %expires_at, "Issued token");

        Ok(IssuedToken {
            token,
            user_id,
            expires_at,
        })
    }

    /// Resolves a token to its user id as of now
    pub async fn resolve(&self, token: &str) -> Result<DbId, TokenError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolves a token to its user id as of `now`
    ///
    /// # Errors
    ///
    /// - `NoAuthorization` for a malformed or unknown token
    /// - `Expired` when `now > expires_at`
    /// - `Store` when the lookup fails
    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<DbId, TokenError> {
        if !is_well_formed(token) {
            return Err(TokenError::NoAuthorization);
        }

        let record = self
            .store
            .find_token(&hash_token(token))
            .await?
            .ok_or(TokenError::NoAuthorization)?;

        if is_expired(record.expires_at, now) {
            warn!(user_id = record.user_id, "Rejected expired token");
            return Err(TokenError::Expired);
        }

        Ok(record.user_id)
    }
}
