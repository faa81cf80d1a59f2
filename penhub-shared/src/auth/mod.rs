/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing with configurable cost
/// - [`credentials`]: login/password verification
/// - [`token`]: opaque login tokens, stored as SHA-256 digests
/// - [`accounts`]: registration and login
/// - [`authorization`]: ownership rule for mutations
/// - [`middleware`]: Axum token gate and `AuthContext`
///
/// # Example
///
/// ```
/// use penhub_shared::auth::password::{hash_password_with, verify_password, PasswordParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password_with("secret1", &PasswordParams::new(256, 1, 1))?;
/// assert!(verify_password("secret1", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod accounts;
pub mod authorization;
pub mod credentials;
pub mod middleware;
pub mod password;
pub mod token;
