//! Credential and code format validation

use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest code a generator may produce
pub const MIN_CODE_LENGTH: usize = 4;

/// Longest code a generator may produce
pub const MAX_CODE_LENGTH: usize = 12;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").unwrap()
});

// E.164
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Check if an email address is plausibly deliverable
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && EMAIL_REGEX.is_match(email)
}

/// Check if a phone number is in E.164 format
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

/// Check if a submitted code has the shape of a generated one
pub fn is_valid_code(code: &str) -> bool {
    let code = code.trim();
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code.chars().all(|c| c.is_ascii_digit())
}
