//! Login identifier - an email address or a tenant-scoped username

use std::fmt;

use crate::error::DomainError;

/// Canonical form of an email address as stored in the lookup table.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// What the user typed into the login form, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    /// Globally unique, resolves the tenant on its own
    Email(String),
    /// Only unique within a tenant, needs a tenant slug to resolve
    Username(String),
}

impl LoginIdentifier {
    /// Classify a raw identifier. Anything containing `@` is an email.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::ValidationError(
                "identifier must not be empty".to_string(),
            ));
        }

        if trimmed.contains('@') {
            Ok(Self::Email(normalize_email(trimmed)))
        } else {
            Ok(Self::Username(trimmed.to_string()))
        }
    }

    #[inline]
    pub fn is_email(&self) -> bool {
        matches!(self, Self::Email(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Email(value) | Self::Username(value) => value,
        }
    }
}

impl fmt::Display for LoginIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
