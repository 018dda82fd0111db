//! Argon2 password hashing.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::{AuthError, AuthResult};

/// Hash a password into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string.
///
/// Malformed stored hashes fail closed: they verify as false rather than
/// erroring, so a corrupted row cannot be logged into.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash of a random throwaway password, stored for accounts provisioned via
/// SSO. Nobody knows the input, so the account cannot log in with a
/// password at all.
pub fn placeholder_hash() -> AuthResult<String> {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let random: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    hash_password(&random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("not-a-phc-string", "hunter2"));
        assert!(!verify_password("", "hunter2"));
    }

    #[test]
    fn placeholder_hashes_are_unique() {
        assert_ne!(placeholder_hash().unwrap(), placeholder_hash().unwrap());
    }
}
