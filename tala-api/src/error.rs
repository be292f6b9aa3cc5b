//! Error shape of the forms backend.
//!
//! Every non-2xx response carries a JSON body of this shape. Status 422
//! additionally fills `errors` with per-row/per-field detail; the client
//! surfaces that path differently from every other failure.

use serde::{Deserialize, Serialize};
use std::fmt;
use tala_core::CellError;

/// Error codes returned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Request is authenticated but lacks permission for the resource
    Forbidden,

    /// Authentication token has expired
    TokenExpired,

    /// Request validation failed (HTTP 422, `errors` is populated)
    ValidationFailed,

    /// Requested record does not exist
    RecordNotFound,

    /// Concurrent modification detected
    Conflict,

    /// Internal server error
    Internal,

    /// Backend temporarily unavailable
    Unavailable,

    /// Any code this client version does not know
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Best-effort mapping for error bodies that carry no code.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorCode::Unauthorized,
            403 => ErrorCode::Forbidden,
            404 => ErrorCode::RecordNotFound,
            409 => ErrorCode::Conflict,
            422 => ErrorCode::ValidationFailed,
            503 => ErrorCode::Unavailable,
            _ => ErrorCode::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::TokenExpired => "TOKEN_EXPIRED",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::RecordNotFound => "RECORD_NOT_FOUND",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Structured error body: `{ code, msg, errors? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {msg}")]
pub struct ApiError {
    #[serde(default = "default_code")]
    pub code: ErrorCode,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CellError>,
}

fn default_code() -> ErrorCode {
    ErrorCode::Internal
}

impl ApiError {
    pub fn is_validation(&self) -> bool {
        self.code == ErrorCode::ValidationFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_round_trips() {
        let json = r#"{"code":"VALIDATION_FAILED","msg":"Validation failed","errors":[{"row":0,"field":"area","msg":"required"}]}"#;
        let error: ApiError = serde_json::from_str(json).unwrap();
        assert!(error.is_validation());
        assert_eq!(error.errors.len(), 1);
        assert_eq!(error.errors[0].field, "area");
        assert_eq!(error.errors[0].message, "required");
        let back = serde_json::to_string(&error).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn bare_msg_body_still_parses() {
        let error: ApiError = serde_json::from_str(r#"{"msg":"boom"}"#).unwrap();
        assert_eq!(error.code, ErrorCode::Internal);
        assert!(error.errors.is_empty());
    }

    #[test]
    fn unknown_codes_do_not_break_parsing() {
        let error: ApiError =
            serde_json::from_str(r#"{"code":"TEAPOT","msg":"short and stout"}"#).unwrap();
        assert_eq!(error.code, ErrorCode::Unknown);
    }
}
