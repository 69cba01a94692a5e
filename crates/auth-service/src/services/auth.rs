//! Authentication service
//!
//! Orchestrates login, token refresh, logout and token verification.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use auth_common::auth::AccessClaims;
use auth_core::value_objects::{ClientMeta, LoginIdentifier, TenantContext};
use auth_core::DirectoryError;

use crate::dto::{LoginRequest, LoginResponse, TokenResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::resolver::LoginResolver;
use super::session::SessionService;

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn sessions(&self) -> SessionService<'a> {
        SessionService::new(self.ctx)
    }

    /// Log in with an email or username, inside the tenant the identifier resolves to
    #[instrument(skip(self, request, client), fields(tenant_slug = request.tenant_slug.as_deref()))]
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientMeta,
    ) -> ServiceResult<LoginResponse> {
        if request.identifier.trim().is_empty() {
            return Err(ServiceError::validation("identifier is required"));
        }
        if request.password.trim().is_empty() {
            return Err(ServiceError::validation("password is required"));
        }

        let identifier = LoginIdentifier::parse(&request.identifier)?;
        let entry = LoginResolver::new(self.ctx.lookup_repo())
            .resolve(&identifier, request.tenant_slug.as_deref())
            .await?;
        let tenant = entry.tenant();

        let user = self
            .ctx
            .user_directory()
            .validate_credentials(&tenant, identifier.as_str(), &request.password)
            .await
            .map_err(|e| directory_failed(e, &tenant))?;

        let session_id = Uuid::new_v4();
        let issued = self
            .ctx
            .jwt_service()
            .generate_token_pair(&user, &tenant, session_id)?;

        self.sessions()
            .create(
                session_id,
                user.id,
                &issued.pair.refresh_token,
                issued.refresh_expires_at,
                client,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to create session");
                ServiceError::internal("failed to create session")
            })?;

        info!(user_id = %user.id, tenant = %tenant, "User logged in");
        Ok(LoginResponse::new(issued.pair, user.with_tenant(&tenant)))
    }

    /// Exchange a refresh token for a new pair, rotating the session's stored hash.
    ///
    /// The presented token stops working as soon as this returns.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenResponse> {
        let claims = self.ctx.jwt_service().validate_refresh_token(refresh_token)?;

        let session = self
            .sessions()
            .get_by_refresh_token(refresh_token)
            .await?
            .ok_or_else(|| {
                warn!(session_id = %claims.session_id, "Refresh with unknown, revoked or rotated token");
                ServiceError::unauthorized("invalid session")
            })?;

        if session.id != claims.session_id || session.user_id != claims.user_id {
            warn!(
                session_id = %session.id,
                claimed_session_id = %claims.session_id,
                "Refresh token does not belong to its session"
            );
            if let Err(e) = self.sessions().revoke_session(session.id).await {
                error!(error = %e, session_id = %session.id, "Failed to revoke mismatched session");
            }
            return Err(ServiceError::unauthorized("invalid session"));
        }

        let tenant = claims.tenant.context();
        let user = self
            .ctx
            .user_directory()
            .get_user(&tenant, claims.user_id)
            .await
            .map_err(|e| directory_failed(e, &tenant))?;

        let issued = self
            .ctx
            .jwt_service()
            .generate_token_pair(&user, &tenant, session.id)?;

        let rotated = self
            .sessions()
            .rotate(session.id, refresh_token, &issued.pair.refresh_token)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to update refresh token hash");
                ServiceError::internal("failed to update session")
            })?;

        if !rotated {
            warn!(session_id = %session.id, "Lost refresh rotation race");
            return Err(ServiceError::unauthorized("refresh token already used"));
        }

        info!(user_id = %user.id, session_id = %session.id, "Tokens refreshed");
        Ok(TokenResponse::from(issued.pair))
    }

    /// Revoke the session behind a refresh token. Never fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, refresh_token: Option<&str>) {
        match refresh_token {
            Some(token) => self.sessions().logout(token).await,
            None => warn!("Logout without refresh token"),
        }
    }

    /// Revoke every session of a user
    #[instrument(skip(self))]
    pub async fn logout_all(&self, user_id: Uuid) -> ServiceResult<u64> {
        self.sessions().revoke_all_for_user(user_id).await
    }

    /// Current profile of a gateway-authenticated user
    #[instrument(skip(self))]
    pub async fn current_user(
        &self,
        user_id: Uuid,
        tenant: &TenantContext,
    ) -> ServiceResult<UserResponse> {
        let user = self
            .ctx
            .user_directory()
            .get_user(tenant, user_id)
            .await
            .map_err(|e| directory_failed(e, tenant))?;
        Ok(UserResponse::from(user.with_tenant(tenant)))
    }

    /// Validate an access token and reject blacklisted ones
    #[instrument(skip_all)]
    pub async fn verify_access_token(&self, token: &str) -> ServiceResult<AccessClaims> {
        let claims = self.ctx.jwt_service().validate_access_token(token)?;

        if self.sessions().is_token_blacklisted(claims.jti()).await? {
            warn!(user_id = %claims.user_id, "Blacklisted access token presented");
            return Err(ServiceError::unauthorized("token has been revoked"));
        }
        Ok(claims)
    }

    /// Blacklist an access token until it would have expired anyway
    #[instrument(skip_all)]
    pub async fn revoke_access_token(&self, token: &str) -> ServiceResult<()> {
        let claims = self.ctx.jwt_service().validate_access_token(token)?;
        self.sessions()
            .blacklist_token(claims.jti(), claims.user_id, claims.registered.expires_at())
            .await?;
        info!(user_id = %claims.user_id, "Access token revoked");
        Ok(())
    }
}

fn directory_failed(err: DirectoryError, tenant: &TenantContext) -> ServiceError {
    match &err {
        DirectoryError::InvalidCredentials => warn!(tenant = %tenant, "Credentials rejected"),
        DirectoryError::NotFound => warn!(tenant = %tenant, "User not found in user service"),
        other => error!(tenant = %tenant, error = %other, "User service call failed"),
    }
    ServiceError::Directory(err)
}
