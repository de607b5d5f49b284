//! bcrypt password hashing.

use wadash_core::error::WadashError;

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, WadashError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

/// Hash a password with bcrypt at an explicit cost.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, WadashError> {
    bcrypt::hash(password, cost).map_err(|e| WadashError::Hash(format!("bcrypt hash failed: {e}")))
}

/// Compare a password against a stored bcrypt hash.
///
/// `Ok(false)` is a mismatch; `Err` means the stored hash could not be used.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, WadashError> {
    bcrypt::verify(password, hash)
        .map_err(|e| WadashError::Hash(format!("bcrypt verify failed: {e}")))
}

/// [`verify_password`] on the blocking pool, so the comparison never stalls
/// an async worker.
pub async fn check_password(password: &str, hash: &str) -> Result<bool, WadashError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| WadashError::Hash(format!("bcrypt task failed: {e}")))?
}

/// [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: &str) -> Result<String, WadashError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| WadashError::Hash(format!("bcrypt task failed: {e}")))?
}
