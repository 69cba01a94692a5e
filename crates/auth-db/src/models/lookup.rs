//! Lookup database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the `user_tenant_lookup` table
#[derive(Debug, Clone, FromRow)]
pub struct LookupModel {
    pub email: String,
    pub username: Option<String>,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub tenant_slug: String,
    pub tenant_schema: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
