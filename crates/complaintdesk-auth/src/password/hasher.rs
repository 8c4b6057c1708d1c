//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use complaintdesk_core::error::AppError;

/// Hashes and verifies account passwords with Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    min_length: usize,
}

impl PasswordHasher {
    /// Create a hasher that refuses passwords shorter than `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Reject a candidate password that does not meet the length policy.
    pub fn check_policy(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }
        Ok(())
    }

    /// Hash a plaintext password with a random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a plaintext password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only a corrupt stored hash is an error.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new(6);
        let hash = hasher.hash("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hunter22", &hash).unwrap());
        assert!(!hasher.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_error() {
        assert!(PasswordHasher::new(6).verify("x", "plaintext").is_err());
    }

    #[test]
    fn test_policy_counts_characters() {
        let hasher = PasswordHasher::new(6);
        assert!(hasher.check_policy("12345").is_err());
        assert!(hasher.check_policy("123456").is_ok());
        assert!(hasher.check_policy("ñññññ").is_err());
    }
}
