//! User profile - the user as described by the user service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::serde_util::empty_as_none;
use crate::value_objects::TenantContext;

/// Profile returned by the user service's internal endpoints.
///
/// The tenant fields are advisory: the authentication flow overwrites them with the tenant
/// it resolved itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(default)]
    pub tenant_slug: Option<String>,
    #[serde(default)]
    pub tenant_schema: Option<String>,
}

impl UserProfile {
    /// Display name embedded in access tokens
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Replace whatever tenant the profile claims with the given one
    pub fn with_tenant(mut self, tenant: &TenantContext) -> Self {
        self.tenant_id = Some(tenant.tenant_id());
        self.tenant_slug = Some(tenant.tenant_slug().to_string());
        self.tenant_schema = Some(tenant.tenant_schema().to_string());
        self
    }
}
