//! Application state
//!
//! Holds the shared state for the Axum application including
//! the service context, configuration and readiness probe.

use std::sync::Arc;

use async_trait::async_trait;
use auth_bus::RedisPool;
use auth_common::{AppConfig, JwtService};
use auth_db::PgPool;
use auth_service::ServiceContext;

/// Backing-service checks behind `/health/ready`
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn database(&self) -> bool;
    async fn redis(&self) -> bool;
}

/// Probe that pings the real Postgres and Redis pools
#[derive(Debug, Clone)]
pub struct BackendProbe {
    pool: PgPool,
    redis: RedisPool,
}

impl BackendProbe {
    pub fn new(pool: PgPool, redis: RedisPool) -> Self {
        Self { pool, redis }
    }
}

#[async_trait]
impl ReadinessProbe for BackendProbe {
    async fn database(&self) -> bool {
        auth_db::ping(&self.pool).await.is_ok()
    }

    async fn redis(&self) -> bool {
        self.redis.health_check().await.is_ok()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    config: Arc<AppConfig>,
    readiness: Arc<dyn ReadinessProbe>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        config: AppConfig,
        readiness: Arc<dyn ReadinessProbe>,
    ) -> Self {
        Self {
            service_context,
            config: Arc::new(config),
            readiness,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Shared handle for background workers
    pub fn shared_context(&self) -> Arc<ServiceContext> {
        Arc::clone(&self.service_context)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }

    pub fn readiness(&self) -> &dyn ReadinessProbe {
        self.readiness.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("env", &self.config.app.env)
            .finish()
    }
}
