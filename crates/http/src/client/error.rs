//! Client error types

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Why a session refresh did not produce a new token
///
/// Shared by every caller waiting on the same refresh, hence `Clone`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The backend refused the refresh credential or the call failed
    #[error("{0}")]
    Rejected(String),

    /// The refresh did not settle before the deadline
    #[error("refresh timed out after {0:?}")]
    TimedOut(Duration),
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// 401 that could not be recovered by a refresh
    #[error("{operation} failed: {message}")]
    Unauthorized { operation: String, message: String },

    /// 403
    #[error("{operation} failed: {message}")]
    Forbidden { operation: String, message: String },

    /// 404
    #[error("{operation} failed: {message}")]
    NotFound { operation: String, message: String },

    /// 400
    #[error("{operation} failed: {message}")]
    BadRequest { operation: String, message: String },

    /// Any other non-success status
    #[error("{operation} failed: {message}")]
    Server {
        operation: String,
        status: u16,
        message: String,
    },

    /// Login, signup or logout rejected by the backend
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Session refresh failed or timed out
    #[error("Session refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request rejected locally before it was sent
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ootd_core::CoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code. `operation` is `"{VERB} {path}"`.
    pub fn from_status(operation: impl Into<String>, status: StatusCode, message: String) -> Self {
        let operation = operation.into();
        match status.as_u16() {
            400 => Self::BadRequest { operation, message },
            401 => Self::Unauthorized { operation, message },
            403 => Self::Forbidden { operation, message },
            404 => Self::NotFound { operation, message },
            status => Self::Server {
                operation,
                status,
                message,
            },
        }
    }

    /// HTTP status carried by this error, if it came from a response
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest { .. } => Some(400),
            Self::Unauthorized { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the session is gone and the user has to sign in again
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized { .. } | Self::AuthenticationFailed(_) | Self::Refresh(_)
        )
    }
}
