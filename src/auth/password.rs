use crate::error::{AppError, AppResult};

/// Hash a raw password with bcrypt (salt generated per call).
pub fn hash_password(raw: &str) -> AppResult<String> {
    bcrypt::hash(raw, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a raw password against a stored bcrypt hash.
pub fn verify_password(raw: &str, hash: &str) -> bool {
    bcrypt::verify(raw, hash).unwrap_or(false)
}
