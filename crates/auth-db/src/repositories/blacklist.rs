//! PostgreSQL implementation of TokenBlacklistRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use auth_core::entities::TokenBlacklistEntry;
use auth_core::traits::{RepoResult, TokenBlacklistRepository};

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgTokenBlacklistRepository {
    pool: PgPool,
}

impl PgTokenBlacklistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenBlacklistRepository for PgTokenBlacklistRepository {
    #[instrument(skip(self, entry), fields(jti = %entry.token_jti, user_id = %entry.user_id))]
    async fn add(&self, entry: &TokenBlacklistEntry) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO public.token_blacklist (token_jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (token_jti) DO NOTHING
            ",
        )
        .bind(&entry.token_jti)
        .bind(entry.user_id)
        .bind(entry.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn contains(&self, token_jti: &str) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM public.token_blacklist
                WHERE token_jti = $1 AND expires_at > NOW()
            )
            ",
        )
        .bind(token_jti)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM public.token_blacklist
            WHERE expires_at <= NOW()
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
