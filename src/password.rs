use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tokio::task::spawn_blocking;

use crate::errors::AppError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Argon2 with a fresh salt. Runs on the blocking pool.
pub async fn hash_password(plain: String) -> Result<String, AppError> {
    spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|phc| phc.to_string())
            .map_err(|e| AppError::Internal(format!("argon2 hash: {e}")))
    })
    .await
    .map_err(|e| AppError::Internal(format!("hash task: {e}")))?
}

/// `Ok(false)` on mismatch; a stored hash that is not a PHC string is an internal error.
pub async fn verify_password(plain: String, stored: String) -> Result<bool, AppError> {
    spawn_blocking(move || {
        let phc = PasswordHash::new(&stored)
            .map_err(|e| AppError::Internal(format!("stored hash unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &phc)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(format!("verify task: {e}")))?
}
