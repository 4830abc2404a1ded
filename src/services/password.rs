//! Password hashing with Argon2id

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::LazyLock;
use thiserror::Error;

use crate::constants::MIN_PASSWORD_LENGTH;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Reject passwords too short to accept
pub fn check_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(())
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Check a password against a stored PHC string. Malformed hashes never match.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when the account does not exist, so unknown emails pay the
/// same Argon2 cost as known ones
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("vidshelf-decoy-password").ok());

/// Verify against the account's hash, or burn a verification against the
/// decoy when there is no account. A missing account never matches.
pub fn verify_or_decoy(password: &str, stored_hash: Option<&str>) -> bool {
    match stored_hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(decoy) = DECOY_HASH.as_deref() {
                verify_password(password, decoy);
            }
            false
        }
    }
}
