//! Input validation utilities.
//!
//! This module contains functions for validating configuration and template inputs before they
//! are used to build services.

use crate::{FeedbackError, FeedbackResult};

/// Validates an ISO 639-1 style language code such as `en` or `pt`.
///
/// Codes are two or three lowercase ASCII letters. Anything else is rejected so the value can
/// be passed to a translation service verbatim.
///
/// # Errors
///
/// Returns a `FeedbackError::InvalidInput` if the code is empty or malformed.
pub fn validate_language_code(code: &str) -> FeedbackResult<()> {
    if code.trim().is_empty() {
        return Err(FeedbackError::InvalidInput(
            "language code cannot be empty".into(),
        ));
    }

    if !(2..=3).contains(&code.len()) || !code.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(FeedbackError::InvalidInput(format!(
            "language code must be 2-3 lowercase ASCII letters, got {:?}",
            code
        )));
    }

    Ok(())
}

/// Validates that a template or question identifier is safe to use as a URL path segment
/// and as a form key.
///
/// # Errors
///
/// Returns a `FeedbackError::InvalidInput` if the identifier is empty, too long, or contains
/// characters outside `[A-Za-z0-9._-]`.
pub fn validate_identifier(kind: &str, id: &str) -> FeedbackResult<()> {
    const MAX_IDENTIFIER_LEN: usize = 64;

    if id.trim().is_empty() {
        return Err(FeedbackError::InvalidInput(format!("{kind} cannot be empty")));
    }

    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(FeedbackError::InvalidInput(format!(
            "{kind} exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LEN
        )));
    }

    let ok = id
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

    if !ok {
        return Err(FeedbackError::InvalidInput(format!(
            "{kind} contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
        )));
    }

    Ok(())
}
