//! Lookup entry - maps a login identifier to the tenant that owns the user

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::{normalize_email, TenantContext};

/// One row of the cross-tenant `user_tenant_lookup` table.
///
/// `email` is globally unique; `(username, tenant_slug)` is unique when a username is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub email: String,
    pub username: Option<String>,
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub tenant_slug: String,
    pub tenant_schema: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LookupEntry {
    /// Create an entry; the email is normalized and a blank username is dropped.
    pub fn new(
        email: &str,
        username: Option<&str>,
        user_id: Uuid,
        tenant: &TenantContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            email: normalize_email(email),
            username: username
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            user_id,
            tenant_id: tenant.tenant_id(),
            tenant_slug: tenant.tenant_slug().to_string(),
            tenant_schema: tenant.tenant_schema().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The tenant this user belongs to
    pub fn tenant(&self) -> TenantContext {
        TenantContext::new(self.tenant_id, &self.tenant_slug, &self.tenant_schema)
    }

    /// Same user and tenant, different email (used for email changes)
    pub fn with_email(&self, email: &str) -> Self {
        let mut entry = self.clone();
        entry.email = normalize_email(email);
        entry.updated_at = Utc::now();
        entry
    }
}
