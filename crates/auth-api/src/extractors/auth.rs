//! Bearer token extractors
//!
//! Pull the raw token out of `Authorization: Bearer <token>`. Validation is left to the
//! handler because the same header carries access tokens (verify, revoke) and refresh
//! tokens (logout).

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::response::ApiError;

/// Raw bearer token; rejects with 401 when absent
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        Ok(Self(bearer.token().to_string()))
    }
}

/// Bearer token if one is present and well-formed
#[derive(Debug, Clone)]
pub struct OptionalBearer(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalBearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state)
            .await
            .ok()
            .map(|BearerToken(token)| token);
        Ok(Self(token))
    }
}
