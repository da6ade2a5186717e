//! Input validation for scalar columns.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(&'static str),

    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum allowed length for template names.
pub const MAX_TEMPLATE_NAME_LENGTH: usize = 100;

pub const MAX_PHONE_LENGTH: usize = 35;

pub const MAX_TELEGRAM_LENGTH: usize = 150;

/// Validate an email address (basic `local@domain.tld` shape).
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = required("email", email, MAX_EMAIL_LENGTH)?;

    let (local, domain) = match email.split_once('@') {
        Some((local, domain)) if !domain.contains('@') => (local, domain),
        _ => return Err(ValidationError::InvalidEmail("must contain exactly one @ symbol")),
    };

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail("missing local part (before @)"));
    }
    if !domain.contains('.') {
        return Err(ValidationError::InvalidEmail("domain must contain at least one dot"));
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ValidationError::InvalidEmail("domain has a misplaced dot"));
    }

    Ok(())
}

/// Validate a card template name: non-empty, at most 100 characters.
pub fn validate_template_name(name: &str) -> Result<(), ValidationError> {
    required("name", name, MAX_TEMPLATE_NAME_LENGTH).map(|_| ())
}

/// Validate an optional phone number.
pub fn validate_phone(phone: Option<&str>) -> Result<(), ValidationError> {
    optional("phone", phone, MAX_PHONE_LENGTH)
}

/// Validate an optional telegram username.
pub fn validate_telegram(telegram: Option<&str>) -> Result<(), ValidationError> {
    optional("telegram", telegram, MAX_TELEGRAM_LENGTH)
}

fn required<'a>(field: &'static str, value: &'a str, max: usize) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    check_length(field, value, max)?;
    Ok(value)
}

fn optional(field: &'static str, value: Option<&str>, max: usize) -> Result<(), ValidationError> {
    match value {
        Some(value) => check_length(field, value, max),
        None => Ok(()),
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
