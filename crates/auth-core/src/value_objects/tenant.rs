//! Tenant context - the tenant a request or token is bound to
//!
//! A `TenantContext` is resolved once (from the lookup table, token claims or gateway
//! headers) and then passed explicitly to everything that needs it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Immutable identity of a tenant: id, public slug and database schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    tenant_id: Uuid,
    tenant_slug: String,
    tenant_schema: String,
}

impl TenantContext {
    pub fn new(
        tenant_id: Uuid,
        tenant_slug: impl Into<String>,
        tenant_schema: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            tenant_slug: tenant_slug.into(),
            tenant_schema: tenant_schema.into(),
        }
    }

    /// Build a context from loosely-typed parts (event payloads, headers).
    ///
    /// Returns `None` unless both the tenant id and a non-empty schema are present.
    pub fn from_parts(
        tenant_id: Option<Uuid>,
        tenant_slug: &str,
        tenant_schema: &str,
    ) -> Option<Self> {
        let tenant_id = tenant_id?;
        let tenant_schema = tenant_schema.trim();
        if tenant_schema.is_empty() {
            return None;
        }
        Some(Self::new(tenant_id, tenant_slug.trim(), tenant_schema))
    }

    #[inline]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    #[inline]
    pub fn tenant_slug(&self) -> &str {
        &self.tenant_slug
    }

    #[inline]
    pub fn tenant_schema(&self) -> &str {
        &self.tenant_schema
    }

    /// Whether a caller-supplied slug names this tenant.
    ///
    /// Exact match after trimming, the same rule the username lookup applies.
    pub fn matches_slug(&self, slug: &str) -> bool {
        self.tenant_slug == slug.trim()
    }
}

impl fmt::Display for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.tenant_slug, self.tenant_id)
    }
}
