//! Request field validation shared by the login and admin endpoints.

use serde_json::Value;

/// Why a string field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Absent or `null`.
    Missing,
    /// Present but not a JSON string.
    NotString,
    /// The empty string.
    Empty,
    /// Shorter than the required number of characters.
    TooShort(usize),
}

/// Check that `value` is a non-empty string of at least `min_chars` characters.
///
/// Length counts Unicode scalar values, not bytes. No trimming is applied.
pub fn required_string(value: Option<&Value>, min_chars: usize) -> Result<&str, FieldError> {
    let s = match value {
        None | Some(Value::Null) => return Err(FieldError::Missing),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(FieldError::NotString),
    };
    if s.is_empty() {
        return Err(FieldError::Empty);
    }
    if s.chars().count() < min_chars {
        return Err(FieldError::TooShort(min_chars));
    }
    Ok(s)
}
