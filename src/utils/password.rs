//! Password hashing
//!
//! Argon2id hashing and verification for account and link passwords.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

#[derive(Debug)]
pub enum PasswordError {
    HashError(String),
    VerifyError(String),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HashError(msg) => write!(f, "Password hash error: {}", msg),
            Self::VerifyError(msg) => write!(f, "Password verify error: {}", msg),
        }
    }
}

impl std::error::Error for PasswordError {}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verify a candidate against a stored hash. A mismatch is `Ok(false)`,
/// not an error; mismatches are routine.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerifyError(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn is_argon2_hash(s: &str) -> bool {
    s.starts_with("$argon2")
}

/// Process a password on a settings update.
///
/// - `None` keeps the existing hash
/// - empty string removes the password
/// - anything else is hashed fresh; pre-hashed values are not accepted
pub fn process_update_password(
    new_password: Option<&str>,
    existing_hash: Option<String>,
) -> Result<Option<String>, PasswordError> {
    match new_password {
        Some(pwd) if !pwd.is_empty() => hash_password(pwd).map(Some),
        Some(_) => Ok(None),
        None => Ok(existing_hash),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct horse battery";
        let hash = hash_password(password).expect("hash should succeed");

        assert!(is_argon2_hash(&hash));
        assert!(verify_password(password, &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_process_update_password_keeps_existing() {
        let existing = Some("$argon2id$existing".to_string());
        let result = process_update_password(None, existing.clone()).unwrap();
        assert_eq!(result, existing);
    }

    #[test]
    fn test_process_update_password_removes_on_empty() {
        let existing = Some("$argon2id$existing".to_string());
        let result = process_update_password(Some(""), existing).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_process_update_password_rehashes() {
        let result = process_update_password(Some("new secret"), None)
            .unwrap()
            .unwrap();
        assert!(is_argon2_hash(&result));
        assert!(verify_password("new secret", &result).unwrap());
    }
}
