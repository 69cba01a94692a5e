//! Authentication handlers
//!
//! Endpoints for login, token refresh, logout, the current user and token verification.

use axum::{extract::State, Json};
use auth_service::dto::{
    LoginRequest, LoginResponse, LogoutRequest, RefreshTokenRequest, TokenResponse, UserResponse,
    VerifyResponse,
};
use auth_service::AuthService;

use crate::extractors::{
    BearerToken, ClientInfo, GatewayIdentity, GatewayUser, OptionalBearer, ValidatedJson,
};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Login with an email, or a username plus tenant slug
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = AuthService::new(state.service_context())
        .login(request, client)
        .await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new pair
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let response = AuthService::new(state.service_context())
        .refresh(&request.refresh_token)
        .await?;
    Ok(Json(response))
}

/// Revoke the session behind a refresh token.
///
/// The token comes from the body, or from the Authorization header. Always 204.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    OptionalBearer(bearer): OptionalBearer,
    body: Option<Json<LogoutRequest>>,
) -> NoContent {
    let token = body
        .and_then(|Json(request)| request.refresh_token)
        .filter(|token| !token.trim().is_empty())
        .or(bearer);

    AuthService::new(state.service_context())
        .logout(token.as_deref())
        .await;
    NoContent
}

/// Revoke every session of the gateway-authenticated user
///
/// POST /api/v1/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    GatewayUser { user_id }: GatewayUser,
) -> ApiResult<NoContent> {
    AuthService::new(state.service_context())
        .logout_all(user_id)
        .await?;
    Ok(NoContent)
}

/// Current user, as the gateway identified them
///
/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    identity: GatewayIdentity,
) -> ApiResult<Json<UserResponse>> {
    let user = AuthService::new(state.service_context())
        .current_user(identity.user_id, &identity.tenant)
        .await?;
    Ok(Json(user))
}

/// Claims of a valid, non-revoked access token
///
/// POST /api/v1/auth/verify
pub async fn verify(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<VerifyResponse>> {
    let claims = AuthService::new(state.service_context())
        .verify_access_token(&token)
        .await?;
    Ok(Json(VerifyResponse::from(claims)))
}

/// Blacklist an access token until it expires
///
/// POST /api/v1/auth/revoke
pub async fn revoke(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<NoContent> {
    AuthService::new(state.service_context())
        .revoke_access_token(&token)
        .await?;
    Ok(NoContent)
}
