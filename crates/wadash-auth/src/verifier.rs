//! Administrator credential verification.
//!
//! Validates the submitted fields, looks the username up in the configured
//! [`CredentialStore`], and compares the password against the stored bcrypt
//! hash.

use crate::hash::check_password;
use crate::validate::{required_string, FieldError};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};
use wadash_core::traits::CredentialStore;

const USERNAME_MIN_CHARS: usize = 3;
const PASSWORD_MIN_CHARS: usize = 6;

/// Message returned for store and hash failures; details go to the log.
const GENERIC_FAILURE: &str = "An error occurred while processing your request";

/// Outcome of a failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The submitted fields are missing or malformed.
    #[error("{0}")]
    BadRequest(String),
    /// Unknown account or wrong password.
    #[error("{0}")]
    Unauthorized(String),
    /// Store failure or corrupt record.
    #[error("{0}")]
    Internal(String),
}

/// Login form body. Fields stay untyped so validation can report
/// non-string values instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<Value>,
    #[serde(default)]
    pub password: Option<Value>,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: Some(Value::String(username.to_string())),
            password: Some(Value::String(password.to_string())),
        }
    }

    /// Check both fields, username first. Returns `(username, password)`.
    pub fn validated(&self) -> Result<(&str, &str), VerifyError> {
        let username = required_string(self.username.as_ref(), USERNAME_MIN_CHARS)
            .map_err(|e| VerifyError::BadRequest(field_message("Username", e)))?;
        let password = required_string(self.password.as_ref(), PASSWORD_MIN_CHARS)
            .map_err(|e| VerifyError::BadRequest(field_message("Password", e)))?;
        Ok((username, password))
    }
}

/// Checks login attempts against a credential store.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Verify a login attempt. Returns the authenticated username.
    pub async fn verify(&self, request: &LoginRequest) -> Result<String, VerifyError> {
        let (username, password) = request.validated()?;

        let record = self
            .store
            .find_by_username(username)
            .await
            .map_err(|e| {
                error!("credential lookup for '{username}' failed: {e}");
                VerifyError::Internal(GENERIC_FAILURE.to_string())
            })?
            .ok_or_else(|| VerifyError::Unauthorized("Account not found".to_string()))?;

        let hash = match record.password.as_deref() {
            Some(h) if !h.is_empty() => h,
            _ => {
                error!("credential record for '{username}' has no password hash");
                return Err(VerifyError::Internal(
                    "Password is missing or not hashed in the database.".to_string(),
                ));
            }
        };

        let matches = check_password(password, hash).await.map_err(|e| {
            error!("password check for '{username}' failed: {e}");
            VerifyError::Internal(GENERIC_FAILURE.to_string())
        })?;

        if !matches {
            warn!("wrong password for '{username}'");
            return Err(VerifyError::Unauthorized(
                "Wrong username or password".to_string(),
            ));
        }

        Ok(username.to_string())
    }
}

/// Human-readable message for a rejected login field.
fn field_message(label: &str, err: FieldError) -> String {
    match err {
        FieldError::Missing => format!("{label} is required"),
        FieldError::NotString => format!("{label} must be a string"),
        FieldError::Empty => format!("{label} cannot be empty"),
        FieldError::TooShort(min) => format!("{label} must be at least {min} characters long"),
    }
}
