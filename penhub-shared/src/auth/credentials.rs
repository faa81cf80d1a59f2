/// Login/password verification against stored Argon2id hashes
///
/// Read-only: verification never changes stored state. Argon2 work runs on
/// the blocking pool so it does not stall the async workers. An unknown login
/// is checked against a decoy hash of the same cost, so both failures take
/// the same time.

use std::sync::{Arc, OnceLock};

use tracing::{debug, error};

use super::password::{hash_password_with, verify_password, PasswordError, PasswordParams};
use crate::db::store::{Store, StoreError};
use crate::models::DbId;

const DECOY_PASSWORD: &str = "penhub-decoy-password";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No such user")]
    NoSuchUser,

    #[error("Invalid password")]
    InvalidPassword,

    #[error(transparent)]
    Hash(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn Store>,
    params: PasswordParams,

    /// Built on first use of an unknown login
    decoy_hash: Arc<OnceLock<String>>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            params: PasswordParams::default(),
            decoy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Cost of the decoy hash; should match the cost of stored hashes
    pub fn with_password_params(mut self, params: PasswordParams) -> Self {
        self.params = params;
        self.decoy_hash = Arc::new(OnceLock::new());
        self
    }

    /// Returns the user id owning `login` when `password` matches
    ///
    /// # Errors
    ///
    /// - `NoSuchUser` when no account has this login
    /// - `InvalidPassword` on mismatch
    /// - `Hash` when the stored hash is unusable
    /// - `Store` when the lookup fails
    pub async fn verify(&self, login: &str, password: &str) -> Result<DbId, CredentialError> {
        let stored = self.store.find_credentials(login).await?;

        let password = password.to_owned();
        let (user_id, hash) = match stored {
            Some(stored) => (Some(stored.user_id), Some(stored.password_hash)),
            None => (None, None),
        };
        let decoy_hash = self.decoy_hash.clone();
        let params = self.params;

        let matches = tokio::task::spawn_blocking(move || -> Result<bool, PasswordError> {
            match hash {
                Some(hash) => verify_password(&password, &hash),
                None => {
                    let decoy = match decoy_hash.get() {
                        Some(decoy) => decoy,
                        None => {
                            let built = hash_password_with(DECOY_PASSWORD, &params)?;
                            decoy_hash.get_or_init(|| built)
                        }
                    };
                    verify_password(&password, decoy)
                }
            }
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Password verification task failed");
            PasswordError::VerifyError(e.to_string())
        })??;

        let Some(user_id) = user_id else {
            debug!("Login for unknown account");
            return Err(CredentialError::NoSuchUser);
        };

        if !matches {
            debug!(user_id, "Password mismatch");
            return Err(CredentialError::InvalidPassword);
        }

        Ok(user_id)
    }
}
