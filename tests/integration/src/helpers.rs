//! Test helpers for integration tests
//!
//! Provides a stub user service, test servers backed by in-memory or live storage,
//! and response assertions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use auth_api::{create_app, create_app_state, AppState, Infrastructure, ReadinessProbe};
use auth_common::AppConfig;
use auth_core::entities::{LookupEntry, UserProfile};
use auth_core::traits::LookupRepository;
use auth_core::value_objects::TenantContext;
use auth_db::PgLookupRepository;
use auth_service::{ServiceContextBuilder, UserServiceClient};
use auth_test_utils::{
    fixtures, InMemoryBlacklistRepository, InMemoryLookupRepository, InMemorySessionRepository,
};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode as AxumStatus};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

// ============================================================================
// Stub user service
// ============================================================================

#[derive(Debug, Clone)]
struct StubUser {
    tenant_id: Uuid,
    profile: UserProfile,
    password: String,
}

type StubUsers = Arc<RwLock<Vec<StubUser>>>;

fn tenant_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|raw| raw.parse().ok())
}

fn found(profile: &UserProfile) -> (AxumStatus, Json<Value>) {
    (AxumStatus::OK, Json(json!({ "success": true, "data": profile })))
}

fn failed(status: AxumStatus) -> (AxumStatus, Json<Value>) {
    (status, Json(json!({ "success": false })))
}

async fn validate_credentials(
    State(users): State<StubUsers>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (AxumStatus, Json<Value>) {
    let Some(tenant_id) = tenant_id(&headers) else {
        return failed(AxumStatus::BAD_REQUEST);
    };
    let identifier = body["identifier"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let users = users.read();
    let user = users.iter().find(|u| {
        u.tenant_id == tenant_id
            && (u.profile.email.eq_ignore_ascii_case(identifier)
                || u.profile.username.as_deref() == Some(identifier))
    });

    match user {
        Some(user) if user.password == password => found(&user.profile),
        _ => failed(AxumStatus::UNAUTHORIZED),
    }
}

async fn get_user(
    State(users): State<StubUsers>,
    headers: HeaderMap,
    Path(user_id): Path<Uuid>,
) -> (AxumStatus, Json<Value>) {
    let tenant_id = tenant_id(&headers);
    let users = users.read();
    users
        .iter()
        .find(|u| u.profile.id == user_id && Some(u.tenant_id) == tenant_id)
        .map_or_else(|| failed(AxumStatus::NOT_FOUND), |u| found(&u.profile))
}

/// User service stand-in serving the two internal endpoints on a random port.
///
/// Users are scoped by the `X-Tenant-ID` header, the same way the real service
/// selects a tenant schema.
pub struct StubUserService {
    addr: SocketAddr,
    users: StubUsers,
    _handle: JoinHandle<()>,
}

impl StubUserService {
    pub async fn start() -> Result<Self> {
        let users = StubUsers::default();
        let app = Router::new()
            .route("/api/v1/internal/validate-credentials", post(validate_credentials))
            .route("/api/v1/internal/users/:id", get(get_user))
            .with_state(users.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            users,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn add_user(&self, tenant: &TenantContext, profile: UserProfile, password: &str) {
        self.users.write().push(StubUser {
            tenant_id: tenant.tenant_id(),
            profile,
            password: password.to_string(),
        });
    }
}

/// Base URL nothing listens on
pub async fn unreachable_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

// ============================================================================
// Test server
// ============================================================================

/// Readiness probe with fixed answers, for servers without Postgres or Redis
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe {
    pub database: bool,
    pub redis: bool,
}

#[async_trait]
impl ReadinessProbe for StaticProbe {
    async fn database(&self) -> bool {
        self.database
    }

    async fn redis(&self) -> bool {
        self.redis
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub user_service: StubUserService,
    lookup: Arc<dyn LookupRepository>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server on in-memory storage; needs no external services
    pub async fn start() -> Result<Self> {
        let user_service = StubUserService::start().await?;
        let url = user_service.base_url();
        Self::start_in_memory(user_service, &url, StaticProbe { database: true, redis: true }).await
    }

    /// In-memory server whose user service URL refuses connections
    pub async fn start_without_user_service() -> Result<Self> {
        let user_service = StubUserService::start().await?;
        let url = unreachable_url().await?;
        Self::start_in_memory(user_service, &url, StaticProbe { database: true, redis: true }).await
    }

    /// In-memory server reporting the given readiness
    pub async fn start_with_probe(probe: StaticProbe) -> Result<Self> {
        let user_service = StubUserService::start().await?;
        let url = user_service.base_url();
        Self::start_in_memory(user_service, &url, probe).await
    }

    async fn start_in_memory(
        user_service: StubUserService,
        user_service_url: &str,
        probe: StaticProbe,
    ) -> Result<Self> {
        let config = fixtures::app_config(user_service_url);
        let lookup = Arc::new(InMemoryLookupRepository::new());

        let service_context = ServiceContextBuilder::new()
            .lookup_repo(lookup.clone())
            .session_repo(Arc::new(InMemorySessionRepository::new()))
            .blacklist_repo(Arc::new(InMemoryBlacklistRepository::new()))
            .user_directory(Arc::new(UserServiceClient::from_config(&config.user_service)?))
            .jwt_service(Arc::new(fixtures::jwt_service()))
            .build()?;

        let state = AppState::new(Arc::new(service_context), config, Arc::new(probe));
        Self::serve(state, user_service, lookup).await
    }

    /// Start a server on live Postgres and Redis from the environment
    pub async fn start_with_backends() -> Result<Self> {
        let user_service = StubUserService::start().await?;

        let mut config = test_config()?;
        config.user_service.base_url = user_service.base_url();
        config.lookup_sync.enabled = false;
        config.rate_limit.enabled = false;

        let infra = Infrastructure::connect(&config).await?;
        let lookup = Arc::new(PgLookupRepository::new(infra.pool.clone()));
        let state = create_app_state(config, &infra)?;
        Self::serve(state, user_service, lookup).await
    }

    async fn serve(
        state: AppState,
        user_service: StubUserService,
        lookup: Arc<dyn LookupRepository>,
    ) -> Result<Self> {
        let app = create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            user_service,
            lookup,
            _handle: handle,
        })
    }

    /// Register a user with the stub user service and in the lookup table
    pub async fn seed_user(
        &self,
        tenant: &TenantContext,
        profile: &UserProfile,
        password: &str,
    ) -> Result<()> {
        self.user_service.add_user(tenant, profile.clone(), password);
        self.lookup
            .upsert(&LookupEntry::new(
                &profile.email,
                profile.username.as_deref(),
                profile.id,
                tenant,
            ))
            .await?;
        Ok(())
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.url(path)).json(body).send().await?)
    }

    /// Make a POST request with a bearer token and no body
    pub async fn post_bearer(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.post(self.url(path)).bearer_auth(token).send().await?)
    }

    /// Make a request carrying the gateway identity headers
    pub fn as_gateway(&self, request: RequestBuilder, user_id: Uuid, tenant: &TenantContext) -> RequestBuilder {
        request
            .header("X-User-ID", user_id.to_string())
            .header("X-Tenant-ID", tenant.tenant_id().to_string())
            .header("X-Tenant-Slug", tenant.tenant_slug())
            .header("X-Tenant-Schema", tenant.tenant_schema())
    }

    /// GET with the gateway identity headers
    pub async fn get_as(&self, path: &str, user_id: Uuid, tenant: &TenantContext) -> Result<Response> {
        let request = self.as_gateway(self.client.get(self.url(path)), user_id, tenant);
        Ok(request.send().await?)
    }

    /// POST with the gateway identity headers and no body
    pub async fn post_as(&self, path: &str, user_id: Uuid, tenant: &TenantContext) -> Result<Response> {
        let request = self.as_gateway(self.client.post(self.url(path)), user_id, tenant);
        Ok(request.send().await?)
    }
}

/// Create a test configuration from the environment
pub fn test_config() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Helper to check if the live test environment is available
pub async fn check_test_env() -> bool {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("Skipping test: DATABASE_URL not set");
        return false;
    }

    if std::env::var("REDIS_URL").is_err() {
        eprintln!("Skipping test: REDIS_URL not set");
        return false;
    }

    if std::env::var("JWT_SECRET").is_err() {
        eprintln!("Skipping test: JWT_SECRET not set");
        return false;
    }

    true
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(response: Response, expected_status: StatusCode) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(())
}

/// Assert an error response and return its `error.code`
pub async fn assert_error(response: Response, expected_status: StatusCode) -> Result<String> {
    let body: Value = assert_json(response, expected_status).await?;
    body["error"]["code"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("error body without code: {body}"))
}
