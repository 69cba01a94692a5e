//! Domain and token types to response DTOs

use auth_common::auth::{AccessClaims, TokenPair};
use auth_core::entities::UserProfile;

use super::responses::{LoginResponse, TokenResponse, UserResponse, VerifyResponse};

impl From<UserProfile> for UserResponse {
    fn from(user: UserProfile) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_url: user.avatar_url,
            role: user.role,
            permissions: user.permissions,
            is_manager: user.is_manager,
            tenant_id: user.tenant_id,
            tenant_slug: user.tenant_slug,
            tenant_schema: user.tenant_schema,
        }
    }
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at,
            token_type: pair.token_type,
        }
    }
}

impl LoginResponse {
    pub fn new(pair: TokenPair, user: UserProfile) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at,
            token_type: pair.token_type,
            user: UserResponse::from(user),
        }
    }
}

impl From<AccessClaims> for VerifyResponse {
    fn from(claims: AccessClaims) -> Self {
        Self {
            valid: true,
            expires_at: claims.registered.expires_at(),
            user_id: claims.user_id,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            permissions: claims.permissions,
            is_manager: claims.is_manager,
            tenant_id: claims.tenant.tenant_id,
            tenant_slug: claims.tenant.tenant_slug,
            tenant_schema: claims.tenant.tenant_schema,
        }
    }
}
