use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use thiserror::Error;
use tracing::error;

/// Password complexity failures, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("Password must be at least 6 characters long.")]
    TooShort,
    #[error("Password must contain at least one uppercase letter.")]
    NoUppercase,
    #[error("Password must contain at least one number.")]
    NoDigit,
    #[error("Password must contain at least one special character.")]
    NoSpecial,
    #[error("Passwords do not match!")]
    Mismatch,
}

pub const MIN_PASSWORD_CHARS: usize = 6;

lazy_static! {
    static ref UPPER_RE: Regex = Regex::new(r"[A-Z]").unwrap();
    static ref DIGIT_RE: Regex = Regex::new(r"[0-9]").unwrap();
    static ref SPECIAL_RE: Regex = Regex::new(r#"[!@#$%^&*(),.?":{}|<>]"#).unwrap();
}

/// First violated rule wins.
pub fn check_policy(password: &str, confirm: &str) -> Result<(), PolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(PolicyViolation::TooShort);
    }
    if !UPPER_RE.is_match(password) {
        return Err(PolicyViolation::NoUppercase);
    }
    if !DIGIT_RE.is_match(password) {
        return Err(PolicyViolation::NoDigit);
    }
    if !SPECIAL_RE.is_match(password) {
        return Err(PolicyViolation::NoSpecial);
    }
    if password != confirm {
        return Err(PolicyViolation::Mismatch);
    }
    Ok(())
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
