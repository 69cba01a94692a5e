//! Test fixtures: tenants, profiles, event envelopes, configuration and a token manager.

use uuid::Uuid;

use auth_common::auth::JwtService;
use auth_common::{
    AppConfig, AppSettings, CorsConfig, DatabaseConfig, Environment, JwtConfig, LookupSyncConfig,
    RateLimitConfig, RedisConfig, ServerConfig, SessionConfig, UserServiceConfig,
};
use auth_core::entities::UserProfile;
use auth_core::events::{
    EventEnvelope, UserCreatedEvent, UserDeletedEvent, UserUpdatedEvent, USER_CREATED,
    USER_DELETED, USER_UPDATED,
};
use auth_core::value_objects::TenantContext;

pub const TEST_JWT_SECRET: &str = "test-secret-key-that-is-long-enough-for-hs256";
pub const TEST_JWT_ISSUER: &str = "tenant-auth-test";
pub const EVENT_SOURCE: &str = "user-service";

/// Tenant with a fresh id and a schema derived from the slug
pub fn tenant(slug: &str) -> TenantContext {
    TenantContext::new(
        Uuid::new_v4(),
        slug,
        format!("tenant_{}", slug.replace('-', "_")),
    )
}

/// Profile without tenant fields; the directory or the login flow fills them in
pub fn profile(email: &str, username: Option<&str>) -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        email: email.to_string(),
        username: username.map(str::to_string),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        avatar_url: None,
        role: "staff".to_string(),
        permissions: vec!["patients.read".to_string()],
        is_manager: false,
        tenant_id: None,
        tenant_slug: None,
        tenant_schema: None,
    }
}

/// Token manager with 15 minute access and 7 day refresh lifetimes
pub fn jwt_service() -> JwtService {
    JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER, 900, 7 * 24 * 3600)
}

/// Complete configuration for tests that never touch Postgres or Redis.
///
/// Lookup sync and rate limiting are off; the JWT settings match [`jwt_service`].
pub fn app_config(user_service_url: &str) -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "tenant-auth-test".to_string(),
            env: Environment::Development,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/tenant_auth_test".to_string(),
            max_connections: 1,
            min_connections: 0,
            acquire_timeout_secs: 2,
        },
        redis: RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            issuer: TEST_JWT_ISSUER.to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 7 * 24 * 3600,
        },
        user_service: UserServiceConfig {
            base_url: user_service_url.to_string(),
            timeout_ms: 2_000,
        },
        lookup_sync: LookupSyncConfig {
            enabled: false,
            stream: "user.events".to_string(),
            group: "auth-service.test".to_string(),
            consumer: "auth-test".to_string(),
            batch_size: 16,
            block_ms: 100,
            reclaim_idle_ms: 1_000,
            max_deliveries: 3,
        },
        sessions: SessionConfig {
            sweep_interval_secs: 3_600,
        },
        rate_limit: RateLimitConfig {
            enabled: false,
            requests_per_second: 10,
            burst: 50,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
    }
}

fn envelope<T: serde::Serialize>(event_type: &str, data: &T) -> EventEnvelope {
    EventEnvelope::new(event_type, EVENT_SOURCE, data).expect("fixture payload serializes")
}

pub fn created_event(
    user_id: Uuid,
    email: &str,
    username: Option<&str>,
    tenant: Option<&TenantContext>,
) -> EventEnvelope {
    envelope(
        USER_CREATED,
        &UserCreatedEvent {
            user_id,
            email: email.to_string(),
            username: username.map(str::to_string),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role_name: "staff".to_string(),
            tenant_id: tenant.map(TenantContext::tenant_id),
            tenant_slug: tenant.map(|t| t.tenant_slug().to_string()).unwrap_or_default(),
            tenant_schema: tenant
                .map(|t| t.tenant_schema().to_string())
                .unwrap_or_default(),
        },
    )
}

pub fn email_changed_event(
    user_id: Uuid,
    old_email: &str,
    new_email: &str,
    tenant: Option<&TenantContext>,
) -> EventEnvelope {
    let mut fields = serde_json::Map::new();
    fields.insert("email".to_string(), serde_json::Value::from(new_email));
    envelope(
        USER_UPDATED,
        &UserUpdatedEvent {
            user_id,
            fields,
            old_email: Some(old_email.to_string()),
            new_email: Some(new_email.to_string()),
            tenant_id: tenant.map(TenantContext::tenant_id),
            tenant_slug: tenant.map(|t| t.tenant_slug().to_string()).unwrap_or_default(),
            tenant_schema: tenant
                .map(|t| t.tenant_schema().to_string())
                .unwrap_or_default(),
        },
    )
}

pub fn deleted_event(user_id: Uuid, email: Option<&str>) -> EventEnvelope {
    envelope(
        USER_DELETED,
        &UserDeletedEvent {
            user_id,
            email: email.map(str::to_string),
            tenant_id: None,
            tenant_slug: String::new(),
            tenant_schema: String::new(),
        },
    )
}
