//! JSON replies shared by every endpoint: `{code, status, message}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use wadash_auth::VerifyError;

/// Body of every JSON response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiReply {
    pub code: u16,
    pub status: String,
    pub message: String,
}

impl ApiReply {
    /// A 200 reply.
    pub fn ok(status: &str, message: &str) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            status: status.to_string(),
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// A failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 400 `Bad Request`: invalid input.
    BadRequest(String),
    /// 400 `Failed`: valid input the current WhatsApp state cannot serve.
    Failed(String),
    /// 401 `Unauthorized`.
    Unauthorized(String),
    /// 500 `Internal Server Error`.
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, "Bad Request", m),
            Self::Failed(m) => (StatusCode::BAD_REQUEST, "Failed", m),
            Self::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "Unauthorized", m),
            Self::Internal(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                m,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, status, message) = self.parts();
        ApiReply {
            code: code.as_u16(),
            status: status.to_string(),
            message: message.to_string(),
        }
        .into_response()
    }
}

impl From<VerifyError> for ApiError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::BadRequest(m) => Self::BadRequest(m),
            VerifyError::Unauthorized(m) => Self::Unauthorized(m),
            VerifyError::Internal(m) => Self::Internal(m),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
