//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Lookup entry not found: {0}")]
    LookupNotFound(String),

    #[error("Session not found")]
    SessionNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Event is missing tenant context: {0}")]
    MissingTenantContext(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already mapped to another user: {0}")]
    EmailAlreadyExists(String),

    #[error("Username {username} already taken in tenant {tenant_slug}")]
    UsernameAlreadyExists {
        username: String,
        tenant_slug: String,
    },

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::LookupNotFound(_) => "UNKNOWN_LOOKUP",
            Self::SessionNotFound => "UNKNOWN_SESSION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::MissingTenantContext(_) => "MISSING_TENANT_CONTEXT",
            Self::MalformedEvent(_) => "MALFORMED_EVENT",

            // Conflict
            Self::EmailAlreadyExists(_) => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists { .. } => "USERNAME_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LookupNotFound(_) | Self::SessionNotFound)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::MissingTenantContext(_) | Self::MalformedEvent(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists(_) | Self::UsernameAlreadyExists { .. }
        )
    }
}
