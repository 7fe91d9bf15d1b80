//! Credential handling: hashing, verification and prompting
//!
//! Credentials are hashed with argon2 at registration and stored as PHC
//! strings. Stores migrated from the legacy schema may still hold plaintext
//! values; those are compared directly until the owner re-registers.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Environment variable checked before prompting, for non-interactive use.
pub const CREDENTIAL_ENV_VAR: &str = "PAPERTRADE_CREDENTIAL";

/// Hash a credential for storage.
pub fn hash_credential(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a supplied credential against the stored one.
pub fn verify_credential(stored: &str, supplied: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(supplied.as_bytes(), &parsed)
            .is_ok(),
        // Not a PHC string: a plaintext credential from a migrated legacy store
        Err(_) => stored.as_bytes() == supplied.as_bytes(),
    }
}

/// Get or prompt for the account credential.
pub fn prompt_credential(prompt: &str) -> Result<String> {
    // First check environment variable
    if let Ok(secret) = std::env::var(CREDENTIAL_ENV_VAR) {
        return Ok(secret);
    }

    // Otherwise prompt
    let secret = rpassword::prompt_password(prompt)?;
    if secret.is_empty() {
        return Err(anyhow!("Credential cannot be empty"));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_credential_verifies() {
        let stored = hash_credential("hunter2").unwrap();
        assert_ne!(stored, "hunter2");
        assert!(verify_credential(&stored, "hunter2"));
        assert!(!verify_credential(&stored, "hunter3"));
    }

    #[test]
    fn legacy_plaintext_credential_verifies_by_equality() {
        assert!(verify_credential("hunter2", "hunter2"));
        assert!(!verify_credential("hunter2", "wrong"));
    }
}
