// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use accounts_common::RegisterRequest;
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MAX_NAME_LENGTH: usize = 100;
/// Keeps the encoded flat-file key below common file-name limits.
pub const MAX_EMAIL_LENGTH: usize = 160;
/// bcrypt ignores input past 72 bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

/// Possible validation errors
///
/// The `Display` text is shown to the end user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid date of birth: {0}")]
    InvalidDateOfBirth(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Password cannot exceed {MAX_PASSWORD_BYTES} bytes")]
    PasswordTooLong,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A registration request that passed validation
pub struct ValidRegistration {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub password: String,
}

/// Validate a registration request against the calendar date `today`
pub fn validate_registration(
    req: RegisterRequest,
    today: NaiveDate,
) -> ValidationResult<ValidRegistration> {
    let RegisterRequest { name, dob, email, password } = req;
    let name = name.trim();
    let email = email.trim();
    let dob = dob.trim();

    if name.is_empty() || email.is_empty() || dob.is_empty() || password.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }

    validate_email(email)?;

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::PasswordTooLong);
    }

    let date_of_birth = parse_date_of_birth(dob)?;
    if date_of_birth > today {
        return Err(ValidationError::InvalidDateOfBirth(
            "Date of birth cannot be in the future".to_string(),
        ));
    }

    Ok(ValidRegistration {
        name: name.to_string(),
        date_of_birth,
        email: email.to_string(),
        password,
    })
}

/// Parse a date of birth sent as `YYYY-MM-DD` or as an RFC 3339 timestamp.
///
/// Browser date pickers serialize a full timestamp; only its date part is kept.
pub fn parse_date_of_birth(raw: &str) -> ValidationResult<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.date_naive())
        .map_err(|_| ValidationError::InvalidDateOfBirth(format!("'{raw}' is not a valid date")))
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail("Invalid email format".to_string()));
    }

    Ok(email)
}
