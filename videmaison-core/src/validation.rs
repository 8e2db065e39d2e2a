//! Input validation shared by the auth and service-request flows.

use crate::error::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

const DISPOSABLE_DOMAINS: &[&str] = &["10minutemail.com", "tempmail.org", "guerrillamail.com"];

const COMMON_PASSWORDS: &[&str] = &["password123", "admin123", "123456789"];

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Characters stripped by [`sanitize_input`].
const UNSAFE_CHARS: &[char] = &['<', '>', '"', '\'', '/'];

pub fn is_valid_email_format(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validates an account email: format plus a disposable-domain blocklist.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !is_valid_email_format(email) {
        return Err(ValidationError::InvalidEmail);
    }

    let domain = email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .unwrap_or_default();
    if DISPOSABLE_DOMAINS.contains(&domain.as_str()) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validates a new password against the account password policy.
///
/// Rules are checked in order and the first failure is reported.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let weak = |msg: &str| Err(ValidationError::WeakPassword(msg.to_string()));

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return weak("Password must be at least 12 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return weak("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return weak("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return weak("Password must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return weak("Password must contain at least one special character");
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        return weak("Password is too common");
    }

    Ok(())
}

/// Returns the first field whose value is missing or blank.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), ValidationError> {
    for (name, value) in fields {
        if value.is_none_or(|v| v.trim().is_empty()) {
            return Err(ValidationError::MissingField((*name).to_string()));
        }
    }
    Ok(())
}

pub fn check_max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

/// Trims and removes markup-significant characters.
pub fn sanitize_input(value: &str) -> String {
    value.trim().chars().filter(|c| !UNSAFE_CHARS.contains(c)).collect()
}

/// Lower-cased, trimmed form used as the account key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
