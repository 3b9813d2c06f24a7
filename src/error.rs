// Error types shared by the library.
//
// Domain errors are recoverable (the user is asked again), transport
// errors end the session. `anyhow` is only used by the binary.

use thiserror::Error;

/// Result alias for value-object and collection operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// A value or collection rule was broken.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("an identical record is already in the list")]
    Duplicate,

    #[error("the list is full ({max} items)")]
    CapacityExceeded { max: usize },

    #[error("index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server answered with status {status}")]
    Status { status: u16 },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

/// Failure decoding the role claim of a session token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token carries no group claim")]
    MissingGroups,
}

/// Errors that end an interactive session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] ApiError),

    #[error("console failure: {0}")]
    Io(#[from] std::io::Error),
}
