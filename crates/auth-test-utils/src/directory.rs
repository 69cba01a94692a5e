//! Scripted stand-in for the user service.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use auth_core::entities::UserProfile;
use auth_core::error::DirectoryError;
use auth_core::traits::UserDirectory;
use auth_core::value_objects::{normalize_email, TenantContext};

/// One call the directory received, with the tenant it was scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCall {
    pub operation: &'static str,
    pub tenant: TenantContext,
    pub subject: String,
}

#[derive(Debug, Clone)]
struct Account {
    tenant_id: Uuid,
    profile: UserProfile,
    password: String,
}

/// In-memory user service: accounts live inside one tenant each
#[derive(Debug, Default)]
pub struct FakeUserDirectory {
    accounts: RwLock<Vec<Account>>,
    calls: RwLock<Vec<DirectoryCall>>,
    unavailable: AtomicBool,
}

impl FakeUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account inside `tenant`
    pub fn add_user(&self, tenant: &TenantContext, profile: UserProfile, password: &str) {
        self.accounts.write().push(Account {
            tenant_id: tenant.tenant_id(),
            profile: profile.with_tenant(tenant),
            password: password.to_string(),
        });
    }

    /// Make every call fail as if the service were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.read().clone()
    }

    fn record(&self, operation: &'static str, tenant: &TenantContext, subject: String) {
        self.calls.write().push(DirectoryCall {
            operation,
            tenant: tenant.clone(),
            subject,
        });
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for FakeUserDirectory {
    async fn validate_credentials(
        &self,
        tenant: &TenantContext,
        identifier: &str,
        password: &str,
    ) -> Result<UserProfile, DirectoryError> {
        self.record("validate_credentials", tenant, identifier.to_string());
        self.check_available()?;

        let email = normalize_email(identifier);
        self.accounts
            .read()
            .iter()
            .find(|a| {
                a.tenant_id == tenant.tenant_id()
                    && (normalize_email(&a.profile.email) == email
                        || a.profile.username.as_deref() == Some(identifier.trim()))
            })
            .filter(|a| a.password == password)
            .map(|a| a.profile.clone())
            .ok_or(DirectoryError::InvalidCredentials)
    }

    async fn get_user(
        &self,
        tenant: &TenantContext,
        user_id: Uuid,
    ) -> Result<UserProfile, DirectoryError> {
        self.record("get_user", tenant, user_id.to_string());
        self.check_available()?;

        self.accounts
            .read()
            .iter()
            .find(|a| a.tenant_id == tenant.tenant_id() && a.profile.id == user_id)
            .map(|a| a.profile.clone())
            .ok_or(DirectoryError::NotFound)
    }
}
