use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;
const FORBIDDEN_PASSWORD_WORD: &str = "password";

/// Lookup and uniqueness key for an email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Returns the normalized email.
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(email)
}

/// Length is measured on the raw input; the trimmed value is what gets hashed.
pub fn validate_password(password: &str) -> Result<String, ValidationError> {
    let trimmed = password.trim();
    if password.chars().count() < MIN_PASSWORD_LEN || trimmed.is_empty() {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if trimmed.contains(FORBIDDEN_PASSWORD_WORD) {
        return Err(ValidationError::PasswordContainsForbiddenWord);
    }
    Ok(trimmed.to_string())
}

pub fn validate_age(age: i32) -> Result<i32, ValidationError> {
    if age < 0 {
        return Err(ValidationError::NegativeAge);
    }
    Ok(age)
}
