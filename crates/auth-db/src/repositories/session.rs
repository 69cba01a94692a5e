//! PostgreSQL implementation of SessionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use auth_core::entities::Session;
use auth_core::error::DomainError;
use auth_core::traits::{RepoResult, SessionRepository};
use auth_core::value_objects::RefreshTokenHash;

use crate::models::SessionModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of SessionRepository
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Create a new PgSessionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    #[instrument(skip(self, session), fields(session_id = %session.id, user_id = %session.user_id))]
    async fn create(&self, session: &Session) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO public.sessions
                (id, user_id, refresh_token_hash, user_agent, ip_address, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.refresh_token_hash.as_str())
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::InternalError("session id or token hash already in use".to_string())
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_active_by_token_hash(
        &self,
        hash: &RefreshTokenHash,
    ) -> RepoResult<Option<Session>> {
        let result = sqlx::query_as::<_, SessionModel>(
            r"
            SELECT id, user_id, refresh_token_hash, user_agent, ip_address,
                   expires_at, created_at, last_used_at, revoked_at
            FROM public.sessions
            WHERE refresh_token_hash = $1 AND revoked_at IS NULL AND expires_at > NOW()
            ",
        )
        .bind(hash.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Session::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Session>> {
        let result = sqlx::query_as::<_, SessionModel>(
            r"
            SELECT id, user_id, refresh_token_hash, user_agent, ip_address,
                   expires_at, created_at, last_used_at, revoked_at
            FROM public.sessions
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Session::from))
    }

    #[instrument(skip(self))]
    async fn rotate_token_hash(
        &self,
        id: Uuid,
        current: &RefreshTokenHash,
        next: &RefreshTokenHash,
    ) -> RepoResult<bool> {
        // Compare-and-swap: a concurrent refresh that already rotated wins, this one updates 0 rows.
        let result = sqlx::query(
            r"
            UPDATE public.sessions
            SET refresh_token_hash = $3, last_used_at = NOW()
            WHERE id = $1
              AND refresh_token_hash = $2
              AND revoked_at IS NULL
              AND expires_at > NOW()
            ",
        )
        .bind(id)
        .bind(current.as_str())
        .bind(next.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self))]
    async fn revoke(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE public.sessions
            SET revoked_at = NOW()
            WHERE id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn revoke_by_token_hash(&self, hash: &RefreshTokenHash) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE public.sessions
            SET revoked_at = NOW()
            WHERE refresh_token_hash = $1 AND revoked_at IS NULL
            ",
        )
        .bind(hash.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn revoke_all_for_user(&self, user_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE public.sessions
            SET revoked_at = NOW()
            WHERE user_id = $1 AND revoked_at IS NULL
            ",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_expired(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM public.sessions
            WHERE expires_at < NOW() OR revoked_at IS NOT NULL
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
