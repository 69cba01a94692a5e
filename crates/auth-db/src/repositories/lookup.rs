//! PostgreSQL implementation of LookupRepository

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use tracing::instrument;
use uuid::Uuid;

use auth_core::entities::LookupEntry;
use auth_core::error::DomainError;
use auth_core::traits::{LookupRepository, RepoResult};
use auth_core::value_objects::normalize_email;

use crate::models::LookupModel;

use super::error::{map_db_error, map_unique_violation};

/// The only constraint an upsert can still violate is the `(username, tenant_slug)` index.
fn username_taken(entry: &LookupEntry) -> DomainError {
    DomainError::UsernameAlreadyExists {
        username: entry.username.clone().unwrap_or_default(),
        tenant_slug: entry.tenant_slug.clone(),
    }
}

/// PostgreSQL implementation of LookupRepository
#[derive(Clone)]
pub struct PgLookupRepository {
    pool: PgPool,
}

impl PgLookupRepository {
    /// Create a new PgLookupRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert on any executor, so the same statement serves plain calls and transactions
    async fn upsert_with<'e, E>(executor: E, entry: &LookupEntry) -> RepoResult<()>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r"
            INSERT INTO public.user_tenant_lookup
                (email, username, user_id, tenant_id, tenant_slug, tenant_schema, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            ON CONFLICT (email) DO UPDATE SET
                username = EXCLUDED.username,
                user_id = EXCLUDED.user_id,
                tenant_id = EXCLUDED.tenant_id,
                tenant_slug = EXCLUDED.tenant_slug,
                tenant_schema = EXCLUDED.tenant_schema,
                updated_at = NOW()
            ",
        )
        .bind(normalize_email(&entry.email))
        .bind(entry.username.clone())
        .bind(entry.user_id)
        .bind(entry.tenant_id)
        .bind(entry.tenant_slug.clone())
        .bind(entry.tenant_schema.clone())
        .execute(executor)
        .await
        .map_err(|e| map_unique_violation(e, || username_taken(entry)))?;

        Ok(())
    }
}

#[async_trait]
impl LookupRepository for PgLookupRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<LookupEntry>> {
        let result = sqlx::query_as::<_, LookupModel>(
            r"
            SELECT email, username, user_id, tenant_id, tenant_slug, tenant_schema,
                   created_at, updated_at
            FROM public.user_tenant_lookup
            WHERE email = $1
            ",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(LookupEntry::from))
    }

    #[instrument(skip(self))]
    async fn find_by_username(
        &self,
        username: &str,
        tenant_slug: &str,
    ) -> RepoResult<Option<LookupEntry>> {
        let result = sqlx::query_as::<_, LookupModel>(
            r"
            SELECT email, username, user_id, tenant_id, tenant_slug, tenant_schema,
                   created_at, updated_at
            FROM public.user_tenant_lookup
            WHERE username = $1 AND tenant_slug = $2
            ",
        )
        .bind(username.trim())
        .bind(tenant_slug.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(LookupEntry::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user_id(&self, user_id: Uuid) -> RepoResult<Vec<LookupEntry>> {
        let rows = sqlx::query_as::<_, LookupModel>(
            r"
            SELECT email, username, user_id, tenant_id, tenant_slug, tenant_schema,
                   created_at, updated_at
            FROM public.user_tenant_lookup
            WHERE user_id = $1
            ORDER BY created_at
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(LookupEntry::from).collect())
    }

    #[instrument(skip(self, entry), fields(email = %entry.email, user_id = %entry.user_id))]
    async fn upsert(&self, entry: &LookupEntry) -> RepoResult<()> {
        Self::upsert_with(&self.pool, entry).await
    }

    #[instrument(skip(self, entry), fields(new_email = %entry.email, user_id = %entry.user_id))]
    async fn replace_email(&self, old_email: &str, entry: &LookupEntry) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            DELETE FROM public.user_tenant_lookup
            WHERE email = $1
            ",
        )
        .bind(normalize_email(old_email))
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        Self::upsert_with(&mut *tx, entry).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_email(&self, email: &str) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM public.user_tenant_lookup
            WHERE email = $1
            ",
        )
        .bind(normalize_email(email))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_by_user_id(&self, user_id: Uuid) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM public.user_tenant_lookup
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}
