//! Errors raised by the authors API client

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong talking to the authors API
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (connection, DNS, timeout)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any other non-2xx answer, 5xx included
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// 401: bad credentials on login, or the session token was rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// 404: no author (or route) under that id
    #[error("Not found: {0}")]
    NotFound(String),

    /// 400: validation failure reported by the API
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 403: the session may not perform this operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Successful status carrying a `status: false` body
    #[error("{0}")]
    Rejected(String),

    /// A body could not be encoded, or a response did not match its shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bad origin, header name or header value
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Session store could not be read or written
    #[error("Session store error: {0}")]
    Session(String),

    /// Author id that cannot name a single `/autores/:id` resource
    #[error("Invalid author id: {0:?}")]
    InvalidId(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// True when the server rejected the session token
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// The human-readable message without the variant prefix, for display
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationFailed(message)
            | Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::Forbidden(message)
            | Self::Rejected(message)
            | Self::ServerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
