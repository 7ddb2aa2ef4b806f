//! One-way password hashing and verification.
//!
//! bcrypt only looks at the first 72 bytes of its input, so both paths truncate
//! the UTF-8 encoding to that ceiling first. Truncation backs off to the last
//! whole character, which keeps the operation idempotent.

use bcrypt::{hash, verify};

use crate::errors::{ServiceError, ServiceResult};

/// Maximum number of input bytes bcrypt consumes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Work factor bounds accepted by bcrypt.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Truncates `plain` to at most [`MAX_PASSWORD_BYTES`] bytes without splitting
/// a multi-byte character.
pub fn truncate_password(plain: &str) -> &str {
    if plain.len() <= MAX_PASSWORD_BYTES {
        return plain;
    }

    let mut end = MAX_PASSWORD_BYTES;
    while !plain.is_char_boundary(end) {
        end -= 1;
    }
    &plain[..end]
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes a password with a fresh salt.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if the configured cost is out of range.
    pub fn hash(&self, plain: &str) -> ServiceResult<String> {
        hash(truncate_password(plain), self.cost)
            .map_err(|e| ServiceError::internal_error(format!("Password hashing failed: {}", e)))
    }

    /// Checks a password against a stored hash.
    ///
    /// Any failure, including a malformed hash, resolves to `false`.
    pub fn verify(&self, plain: &str, password_hash: &str) -> bool {
        match verify(truncate_password(plain), password_hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!("Password verification failed: {}", e);
                false
            }
        }
    }
}
