//! Test fixtures and data generators
//!
//! Wire-level request and response shapes, plus unique tenants and users.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use auth_core::entities::UserProfile;
use auth_core::value_objects::TenantContext;
use auth_test_utils::fixtures;

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

pub const TEST_PASSWORD: &str = "TestPass123!";

/// A tenant with a slug no other test uses
pub fn unique_tenant(prefix: &str) -> TenantContext {
    fixtures::tenant(&format!("{prefix}-{}-{}", unique_suffix(), std::process::id()))
}

/// A user with a unique email inside `tenant`
pub fn unique_user(tenant: &TenantContext, username: Option<&str>) -> UserProfile {
    let email = format!(
        "user{}.{}@{}.example.com",
        unique_suffix(),
        Uuid::new_v4().simple(),
        tenant.tenant_slug()
    );
    fixtures::profile(&email, username)
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_slug: Option<String>,
}

impl LoginRequest {
    pub fn email(profile: &UserProfile) -> Self {
        Self {
            identifier: profile.email.clone(),
            password: TEST_PASSWORD.to_string(),
            tenant_slug: None,
        }
    }

    pub fn username(username: &str, tenant_slug: Option<&str>) -> Self {
        Self {
            identifier: username.to_string(),
            password: TEST_PASSWORD.to_string(),
            tenant_slug: tenant_slug.map(str::to_string),
        }
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    pub fn with_slug(mut self, tenant_slug: &str) -> Self {
        self.tenant_slug = Some(tenant_slug.to_string());
        self
    }
}

/// Refresh or logout request
#[derive(Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

impl RefreshRequest {
    pub fn new(refresh_token: &str) -> Self {
        Self {
            refresh_token: refresh_token.to_string(),
        }
    }
}

/// Login response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: String,
    pub token_type: String,
    pub user: UserResponse,
}

/// Refresh response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// User response
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub role: String,
    pub tenant_id: Option<Uuid>,
    pub tenant_slug: Option<String>,
    pub tenant_schema: Option<String>,
}

/// Verify response
#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub email: String,
    pub tenant_id: Uuid,
    pub tenant_slug: String,
    pub tenant_schema: String,
}
