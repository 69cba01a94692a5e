//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use auth_common::AppError;
use auth_core::{BusError, DirectoryError, DomainError};
use std::fmt;

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation or repository failure
    Domain(DomainError),

    /// Application error (auth, tenant resolution, etc.)
    App(AppError),

    /// User service call failed
    Directory(DirectoryError),

    /// Message bus failure
    Bus(BusError),

    /// Validation error
    Validation(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::Directory(e) => write!(f, "User service: {e}"),
            Self::Bus(e) => write!(f, "{e}"),
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::Directory(e) => Some(e),
            Self::Bus(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Shorthand for the error every unknown-identity failure collapses to
    pub fn invalid_credentials() -> Self {
        Self::App(AppError::InvalidCredentials)
    }

    /// Shorthand for `AppError::Unauthorized`
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::App(AppError::Unauthorized(msg.into()))
    }

    /// Whether retrying the same operation later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Directory(e) => e.is_retryable(),
            Self::Bus(_) => true,
            Self::Domain(DomainError::DatabaseError(_)) => true,
            Self::App(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else {
                    500
                }
            }
            Self::App(e) => e.status_code(),
            Self::Directory(DirectoryError::InvalidCredentials) => 401,
            Self::Directory(DirectoryError::NotFound) => 404,
            Self::Directory(DirectoryError::Unavailable(_)) | Self::Bus(_) => 503,
            Self::Directory(_) => 500,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::Directory(DirectoryError::InvalidCredentials) => "INVALID_CREDENTIALS",
            Self::Directory(DirectoryError::NotFound) => "NOT_FOUND",
            Self::Directory(DirectoryError::Unavailable(_)) | Self::Bus(_) => "SERVICE_UNAVAILABLE",
            Self::Directory(_) | Self::Internal(_) => "INTERNAL_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<DirectoryError> for ServiceError {
    fn from(err: DirectoryError) -> Self {
        Self::Directory(err)
    }
}

impl From<BusError> for ServiceError {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            ServiceError::Directory(e) => match e {
                DirectoryError::InvalidCredentials => AppError::InvalidCredentials,
                DirectoryError::NotFound => AppError::not_found("User"),
                DirectoryError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
                other => AppError::Internal(anyhow::anyhow!("user service: {other}")),
            },
            ServiceError::Bus(e) => AppError::ServiceUnavailable(e.to_string()),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
