//! Identity forwarded by the API gateway
//!
//! The gateway verifies the access token and passes the caller on as headers; this
//! service trusts them as-is.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use auth_core::value_objects::TenantContext;

use crate::response::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_SLUG_HEADER: &str = "x-tenant-slug";
pub const TENANT_SCHEMA_HEADER: &str = "x-tenant-schema";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn user_id(parts: &Parts) -> Result<Uuid, ApiError> {
    header(parts, USER_ID_HEADER)
        .and_then(|raw| raw.parse().ok())
        .ok_or(ApiError::MissingIdentity)
}

/// Caller's user id from `X-User-ID`
#[derive(Debug, Clone, Copy)]
pub struct GatewayUser {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for GatewayUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            user_id: user_id(parts)?,
        })
    }
}

/// Caller's user id plus the full tenant context from the `X-Tenant-*` headers
#[derive(Debug, Clone)]
pub struct GatewayIdentity {
    pub user_id: Uuid,
    pub tenant: TenantContext,
}

#[async_trait]
impl<S> FromRequestParts<S> for GatewayIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id(parts)?;

        let tenant_id = header(parts, TENANT_ID_HEADER).and_then(|raw| raw.parse().ok());
        let slug = header(parts, TENANT_SLUG_HEADER).ok_or(ApiError::MissingIdentity)?;
        let schema = header(parts, TENANT_SCHEMA_HEADER).unwrap_or_default();
        let tenant =
            TenantContext::from_parts(tenant_id, slug, schema).ok_or(ApiError::MissingIdentity)?;

        Ok(Self { user_id, tenant })
    }
}
