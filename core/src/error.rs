//! Error types for the Tabas API client.
//!
//! # Design
//! The two statuses the API documents get their own variants: `400` means a
//! required field was missing and `404` means an unknown id. Everything else
//! with a status lands in `UnexpectedStatus` with the raw body kept for
//! debugging. `Transport` covers requests that never produced a status.
//!
//! Errors are `Clone` because the query cache hands the same failure to
//! every subscriber of a key.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 400: a required field was missing.
    #[error("validation failed (HTTP 400): {message}")]
    Validation { message: String },

    /// The server returned 404: the requested record does not exist.
    #[error("not found (HTTP 404): {message}")]
    NotFound { message: String },

    /// Any other non-2xx status.
    #[error("HTTP error! status: {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never completed (DNS, refused connection, reset, ...).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the failure, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { .. } => Some(400),
            ApiError::NotFound { .. } => Some(404),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::Transport(_)
            | ApiError::Deserialization(_)
            | ApiError::Serialization(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_reported_for_http_failures() {
        let err = ApiError::Validation {
            message: "Name and email are required".to_string(),
        };
        assert_eq!(err.status(), Some(400));
        assert_eq!(
            ApiError::UnexpectedStatus {
                status: 503,
                body: String::new()
            }
            .status(),
            Some(503)
        );
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
    }

    #[test]
    fn display_carries_status_and_message() {
        let err = ApiError::NotFound {
            message: "User not found".to_string(),
        };
        assert_eq!(err.to_string(), "not found (HTTP 404): User not found");

        let err = ApiError::UnexpectedStatus {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
    }
}
