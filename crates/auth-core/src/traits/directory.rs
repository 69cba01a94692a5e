use async_trait::async_trait;
use uuid::Uuid;

use crate::entities::UserProfile;
use crate::error::DirectoryError;
use crate::value_objects::TenantContext;

/// The user service: owns credentials and profiles inside each tenant.
///
/// Every call is scoped to exactly one tenant.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Check a password for an identifier inside a tenant
    async fn validate_credentials(
        &self,
        tenant: &TenantContext,
        identifier: &str,
        password: &str,
    ) -> Result<UserProfile, DirectoryError>;

    /// Load the current profile of a user
    async fn get_user(
        &self,
        tenant: &TenantContext,
        user_id: Uuid,
    ) -> Result<UserProfile, DirectoryError>;
}
