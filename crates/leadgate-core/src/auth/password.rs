use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::LeadgateError;

/// Hash a plaintext password using Argon2.
pub fn hash_password(password: &str) -> Result<String, LeadgateError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LeadgateError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a plaintext password against a stored hash.
///
/// Argon2 verification is constant-time with respect to the password.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, LeadgateError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| LeadgateError::Internal(format!("Invalid password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_correct_password() {
        let hash = hash_password("Secret123!").unwrap();
        assert!(verify_password("Secret123!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Secret123!").unwrap();
        let b = hash_password("Secret123!").unwrap();
        assert_ne!(a, b);
    }
}
