//! Argon2 password hashes for accounts.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::config::MIN_PASSWORD_LENGTH;
use crate::errors::{AppError, AppResult};

/// Verified against when a login names an unknown username, so a miss
/// costs the same Argon2 work as a wrong password.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$2Nh0V7XdCM0a8kV7wqk7S2vH1o5Jx6u8mE9lQ3bG4Yc";

#[derive(Clone)]
pub struct Password {
    hash: String,
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl Password {
    /// Hash a new password. Too short → field error on `password1`.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH as usize {
            return Err(AppError::field(
                "password1",
                format!(
                    "This password is too short. It must contain at least {} characters.",
                    MIN_PASSWORD_LENGTH
                ),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?
            .to_string();
        Ok(Self { hash })
    }

    /// Registration form pair: both entries must match before hashing.
    pub fn confirmed(password1: &str, password2: &str) -> AppResult<Self> {
        if password1 != password2 {
            return Err(AppError::field("password2", "The two password fields didn't match."));
        }
        Self::new(password1)
    }

    /// Stored hash from the `users` table.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    pub fn into_string(self) -> String {
        self.hash
    }

    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::warn!("Unparseable password hash: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_hash_verifies_after_reload() {
        let hash = Password::new("Str0ng-pass!").unwrap().into_string();
        assert!(hash.starts_with("$argon2id$"));

        let stored = Password::from_hash(hash);
        assert!(stored.verify("Str0ng-pass!"));
        assert!(!stored.verify("str0ng-pass!"));
    }

    #[test]
    fn test_short_password_rejected_on_first_field() {
        let err = Password::new("short").unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("password1"));
    }

    #[test]
    fn test_confirmation_mismatch_reported_on_second_field() {
        let err = Password::confirmed("Password123", "Password124").unwrap_err();
        assert!(err.field_errors().unwrap().contains_key("password2"));
    }

    #[test]
    fn test_dummy_and_garbage_hashes_never_verify() {
        assert!(!Password::from_hash(DUMMY_HASH.to_string()).verify("anything"));
        assert!(!Password::from_hash("not-a-hash".to_string()).verify("anything"));
    }

    #[test]
    fn test_debug_hides_hash() {
        let password = Password::new("Str0ng-pass!").unwrap();
        assert_eq!(format!("{:?}", password), "Password([REDACTED])");
    }
}
