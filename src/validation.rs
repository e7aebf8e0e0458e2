//! Field validators shared by the auth and marketing flows

use regex::Regex;
use std::sync::OnceLock;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    })
}

fn phone_re() -> &'static Regex {
    // Latin or Bengali digits, optional leading +, spaces and dashes allowed
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\+?[0-9০-৯][0-9০-৯ \-]{4,19}$").expect("phone regex is valid")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email.trim())
}

pub fn is_valid_phone(number: &str) -> bool {
    phone_re().is_match(number.trim())
}

pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("https://") || url.starts_with("http://")) && !url.contains(char::is_whitespace)
}

/// Reject empty (after trimming) required fields
pub fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(())
    }
}

/// Reject values longer than `max` characters
pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!(
            "{} exceeds maximum length of {} characters",
            field, max
        ))
    } else {
        Ok(())
    }
}
