//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::Validate;

/// Login with an email or a username, optionally scoped to a tenant subdomain
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 255, message = "Identifier is required"))]
    pub identifier: String,

    #[validate(length(min = 1, max = 1024, message = "Password is required"))]
    pub password: String,

    /// Tenant subdomain; mandatory for username logins
    #[serde(default)]
    pub tenant_slug: Option<String>,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Logout request; the token may come from the Authorization header instead
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}
