/// Password Hashing and Verification
///
/// bcrypt digests plus the strength policy applied to passwords this
/// service creates (admin bootstrap).

use bcrypt::{hash, verify, DEFAULT_COST};
use lazy_static::lazy_static;

use crate::error::{AppError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // Compared against when no identity matches, so unknown accounts cost
    // the same bcrypt work as known ones.
    static ref DUMMY_DIGEST: Option<String> =
        hash("reguides-dummy-password-Digest1", DEFAULT_COST).ok();
}

/// Hash a password using bcrypt at the default cost
///
/// # Errors
/// Returns error if the password fails the strength policy or hashing fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

/// Hash a password using bcrypt at an explicit cost
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AppError> {
    validate_password_strength(password)?;

    hash(password, cost).map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its digest
///
/// # Errors
/// Returns the bcrypt error message if the stored digest is unreadable
pub fn verify_password(password: &str, digest: &str) -> Result<bool, String> {
    verify(password, digest).map_err(|e| format!("Password verification failed: {}", e))
}

/// Spend one bcrypt verification without a real digest
pub fn verify_against_dummy(password: &str) {
    if let Some(digest) = DUMMY_DIGEST.as_ref() {
        let _ = verify(password, digest);
    }
}

/// Validate password strength requirements
///
/// Requirements:
/// - 8 to 128 characters
/// - At least one digit, one lowercase and one uppercase letter
fn validate_password_strength(password: &str) -> Result<(), AppError> {
    if password.is_empty() {
        return Err(AppError::Validation(ValidationError::EmptyField(
            "password".to_string(),
        )));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        )));
    }

    // bcrypt only reads the first 72 bytes; the upper bound also caps hashing work
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AppError::Validation(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        )));
    }

    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        )));
    }

    Ok(())
}
