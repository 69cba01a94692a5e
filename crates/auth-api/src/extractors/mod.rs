//! Axum extractors for request handling
//!
//! Bearer tokens, gateway-forwarded identity, client details and validated JSON bodies.

mod auth;
mod client;
mod gateway;
mod validated;

pub use auth::{BearerToken, OptionalBearer};
pub use client::ClientInfo;
pub use gateway::{
    GatewayIdentity, GatewayUser, TENANT_ID_HEADER, TENANT_SCHEMA_HEADER, TENANT_SLUG_HEADER,
    USER_ID_HEADER,
};
pub use validated::ValidatedJson;
