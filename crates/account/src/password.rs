//! Argon2id password hashing for stored credentials.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Errors that can occur while hashing or checking passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing the password failed.
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// Verification failed for a reason other than a wrong password.
    #[error("password verification failed: {0}")]
    Verify(String),

    /// The stored hash is not a valid PHC string.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

/// Hashes a plaintext password with Argon2id and a fresh random salt.
///
/// The result is a PHC string that embeds the salt and parameters, so it is
/// self-describing for later verification.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Checks a plaintext password against a stored PHC hash.
///
/// A wrong password is an `Ok(false)`, not an error; errors are reserved for
/// hashes that cannot be parsed or unexpected verifier failures.
///
/// # Errors
///
/// Returns `PasswordError::MalformedHash` if the stored hash cannot be
/// parsed, and `PasswordError::Verify` for any other verifier failure.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let hash = PasswordHash::new(stored).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(password.as_bytes(), &hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_argon2id() {
        let hash = hash_password("s3cret-enough").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_ne!(hash, "s3cret-enough");
    }

    #[test]
    fn test_round_trip_accepts_matching_password() {
        let hash = hash_password("s3cret-enough").unwrap();
        assert!(verify_password("s3cret-enough", &hash).unwrap());
    }

    #[test]
    fn test_mismatch_is_false_not_error() {
        let hash = hash_password("s3cret-enough").unwrap();
        assert!(!verify_password("something-else", &hash).unwrap());
    }

    #[test]
    fn test_salting_makes_hashes_unique() {
        let first = hash_password("repeated").unwrap();
        let second = hash_password("repeated").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_stored_hash_is_malformed() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(PasswordError::MalformedHash)
        ));
    }

    #[test]
    fn test_empty_password_still_round_trips() {
        let hash = hash_password("").unwrap();
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password("nonempty", &hash).unwrap());
    }
}
