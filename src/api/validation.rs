//! Input validation for API requests.
//!
//! Field validators return `Result<(), String>`; use the
//! `ValidationErrorBuilder` from the `error` module to collect several
//! of them into one response.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating email addresses (pragmatic, not RFC 5322)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a person name field (first or last name)
pub fn validate_name(name: &str, field_name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if name.len() > 100 {
        return Err(format!("{} is too long (max 100 characters)", field_name));
    }

    Ok(())
}

/// Validate a paper title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    if title.len() > 500 {
        return Err("Title is too long (max 500 characters)".to_string());
    }

    Ok(())
}

/// Validate a plagiarism score; the range is inclusive on both ends
pub fn validate_plagiarism_score(score: f64) -> Result<(), String> {
    if !score.is_finite() || score < 0.0 || score > 100.0 {
        return Err("Plagiarism score must be between 0 and 100".to_string());
    }

    Ok(())
}
