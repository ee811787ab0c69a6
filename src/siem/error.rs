//! Client error types

use reqwest::Method;
use serde::Deserialize;
use std::fmt;

/// Message used when a rejected response body is not a structured error
pub const UNDECODABLE_ERROR: &str = "Could not decode error";

/// Result type for SIEM client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Error body returned by the SIEM API on a rejected request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nCode: {}",
            self.message.as_deref().unwrap_or_default(),
            self.status_code.unwrap_or_default()
        )
    }
}

/// Errors raised by [`super::http::SiemHttpClient`]
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The response status is outside the allow-list for the method
    #[error("{status}\n\n{method} {path}\n{request_body}\n\n{message}")]
    Status {
        method: Method,
        path: String,
        status: reqwest::StatusCode,
        request_body: String,
        message: String,
    },

    /// Connection, TLS or timeout failure before a response was read
    #[error("{method} {path}: request failed: {source}\n{request_body}")]
    Transport {
        method: Method,
        path: String,
        request_body: String,
        #[source]
        source: reqwest::Error,
    },

    /// An allowed response whose body does not match the expected type
    #[error("{method} {path}: failed to decode response body: {source}")]
    Decode {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The underlying HTTP client could not be constructed
    #[error("failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// The request body could not be serialized
    #[error("failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl ClientError {
    /// HTTP status of a rejected response, if one was received
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(reqwest::StatusCode::NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport { source, .. } if source.is_timeout())
    }
}

/// Decode a rejected response body into a human readable message.
/// Falls back to [`UNDECODABLE_ERROR`] when the body is not an error document.
pub fn decode_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) if err.message.is_some() || err.status_code.is_some() => err.to_string(),
        _ => UNDECODABLE_ERROR.to_string(),
    }
}
