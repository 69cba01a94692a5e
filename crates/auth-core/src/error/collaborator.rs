//! Errors raised by the external collaborators behind the domain ports

use thiserror::Error;

/// Failures talking to the user service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("credentials rejected")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error("user service unavailable: {0}")]
    Unavailable(String),

    #[error("user service returned status {0}")]
    UnexpectedStatus(u16),

    #[error("invalid user service response: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Transport-level failures that a client may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Failures talking to the message bus
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus connection error: {0}")]
    Connection(String),

    #[error("bus command failed: {0}")]
    Command(String),
}
