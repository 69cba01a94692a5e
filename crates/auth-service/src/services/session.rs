//! Session lifecycle
//!
//! Sessions are addressed by the SHA-256 of their current refresh token; the raw
//! token never reaches storage.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use auth_core::entities::{Session, TokenBlacklistEntry};
use auth_core::value_objects::{ClientMeta, RefreshTokenHash};

use super::context::ServiceContext;
use super::error::ServiceResult;

pub struct SessionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SessionService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Persist a new session for a freshly issued refresh token
    #[instrument(skip(self, raw_refresh_token, client))]
    pub async fn create(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        raw_refresh_token: &str,
        expires_at: DateTime<Utc>,
        client: ClientMeta,
    ) -> ServiceResult<Session> {
        let session = Session::new(
            session_id,
            user_id,
            RefreshTokenHash::from_raw(raw_refresh_token),
            expires_at,
            client,
        );
        self.ctx.session_repo().create(&session).await?;
        debug!("Session created");
        Ok(session)
    }

    /// The active session currently holding this refresh token, if any
    #[instrument(skip_all)]
    pub async fn get_by_refresh_token(&self, raw_refresh_token: &str) -> ServiceResult<Option<Session>> {
        let hash = RefreshTokenHash::from_raw(raw_refresh_token);
        Ok(self.ctx.session_repo().find_active_by_token_hash(&hash).await?)
    }

    /// Swap the stored hash from `current` to `next`.
    ///
    /// Returns false when another refresh rotated first or the session ended.
    #[instrument(skip(self, current_raw, next_raw))]
    pub async fn rotate(
        &self,
        session_id: Uuid,
        current_raw: &str,
        next_raw: &str,
    ) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .session_repo()
            .rotate_token_hash(
                session_id,
                &RefreshTokenHash::from_raw(current_raw),
                &RefreshTokenHash::from_raw(next_raw),
            )
            .await?)
    }

    /// Revoke the session holding this refresh token. Never fails.
    #[instrument(skip_all)]
    pub async fn logout(&self, raw_refresh_token: &str) {
        if raw_refresh_token.trim().is_empty() {
            return;
        }
        let hash = RefreshTokenHash::from_raw(raw_refresh_token.trim());
        match self.ctx.session_repo().revoke_by_token_hash(&hash).await {
            Ok(true) => debug!("Session revoked"),
            Ok(false) => debug!("Logout for unknown or already revoked session"),
            Err(e) => warn!(error = %e, "Failed to revoke session"),
        }
    }

    /// Revoke one session by id
    #[instrument(skip(self))]
    pub async fn revoke_session(&self, session_id: Uuid) -> ServiceResult<bool> {
        Ok(self.ctx.session_repo().revoke(session_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> ServiceResult<u64> {
        let revoked = self.ctx.session_repo().revoke_all_for_user(user_id).await?;
        info!(revoked, "Revoked all sessions for user");
        Ok(revoked)
    }

    /// Delete expired and revoked sessions
    #[instrument(skip(self))]
    pub async fn clean_expired(&self) -> ServiceResult<u64> {
        Ok(self.ctx.session_repo().delete_expired().await?)
    }

    /// Block an access token until its natural expiry; re-adding is a no-op
    #[instrument(skip(self))]
    pub async fn blacklist_token(
        &self,
        jti: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        let entry = TokenBlacklistEntry::new(jti, user_id, expires_at);
        Ok(self.ctx.blacklist_repo().add(&entry).await?)
    }

    #[instrument(skip(self))]
    pub async fn is_token_blacklisted(&self, jti: &str) -> ServiceResult<bool> {
        Ok(self.ctx.blacklist_repo().contains(jti).await?)
    }

    /// Delete blacklist rows whose token has expired anyway
    #[instrument(skip(self))]
    pub async fn purge_blacklist(&self) -> ServiceResult<u64> {
        Ok(self.ctx.blacklist_repo().purge_expired().await?)
    }
}
