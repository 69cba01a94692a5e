//! Server setup and initialization
//!
//! Provides the application builder, background workers and the server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth_bus::{RedisPool, RedisStreamSource, StreamConfig};
use auth_common::{AppConfig, AppError, JwtService, ShutdownCoordinator, ShutdownToken};
use auth_db::{
    create_pool, ensure_schema, PgLookupRepository, PgPool, PgSessionRepository,
    PgTokenBlacklistRepository,
};
use auth_service::{
    LookupSyncConsumer, LookupSyncHandler, ServiceContextBuilder, SessionSweeper,
    UserServiceClient,
};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_rate_limit};
use crate::routes::{create_router, health_routes};
use crate::state::{AppState, BackendProbe};

/// How long background workers get to finish after the server stops
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Connected backing services
#[derive(Debug, Clone)]
pub struct Infrastructure {
    pub pool: PgPool,
    pub redis: RedisPool,
}

impl Infrastructure {
    /// Connect to Postgres and Redis and bootstrap the schema
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = create_pool(&auth_db::DatabaseConfig::from(&config.database))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        ensure_schema(&pool)
            .await
            .map_err(|e| AppError::Database(format!("schema bootstrap failed: {e}")))?;
        info!("PostgreSQL connection established");

        info!("Connecting to Redis...");
        let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Config(e.to_string()))?;
        redis
            .health_check()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("redis: {e}")))?;
        info!("Redis connection established");

        Ok(Self { pool, redis })
    }
}

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = {
        let config = state.config();
        let api = apply_rate_limit(create_router(), &config.rate_limit);
        apply_middleware(
            api.merge(health_routes()),
            &config.cors,
            config.app.env.is_production(),
        )
    };
    router.with_state(state)
}

/// Wire repositories, the user-service client and the token service into an AppState
pub fn create_app_state(config: AppConfig, infra: &Infrastructure) -> Result<AppState, AppError> {
    let user_directory = UserServiceClient::from_config(&config.user_service)?;
    info!(base_url = %user_directory.base_url(), "User service client configured");

    let service_context = ServiceContextBuilder::new()
        .lookup_repo(Arc::new(PgLookupRepository::new(infra.pool.clone())))
        .session_repo(Arc::new(PgSessionRepository::new(infra.pool.clone())))
        .blacklist_repo(Arc::new(PgTokenBlacklistRepository::new(infra.pool.clone())))
        .user_directory(Arc::new(user_directory))
        .jwt_service(Arc::new(JwtService::from_config(&config.jwt)))
        .build()?;

    let probe = BackendProbe::new(infra.pool.clone(), infra.redis.clone());
    Ok(AppState::new(Arc::new(service_context), config, Arc::new(probe)))
}

/// Start the lookup sync consumer (when enabled) and the session sweeper
pub async fn spawn_workers(
    state: &AppState,
    infra: &Infrastructure,
    coordinator: &ShutdownCoordinator,
) -> Result<Vec<JoinHandle<()>>, AppError> {
    let config = state.config();
    let mut workers = Vec::with_capacity(2);

    if config.lookup_sync.enabled {
        let source = RedisStreamSource::new(
            infra.redis.clone(),
            StreamConfig::from(&config.lookup_sync),
        );
        source
            .ensure_group()
            .await
            .map_err(|e| AppError::ServiceUnavailable(format!("redis stream group: {e}")))?;

        let handler = LookupSyncHandler::new(Arc::new(PgLookupRepository::new(infra.pool.clone())));
        let consumer = LookupSyncConsumer::new(
            Arc::new(source),
            handler,
            config.lookup_sync.batch_size,
            config.lookup_sync.max_deliveries,
        );
        info!(
            stream = %config.lookup_sync.stream,
            group = %config.lookup_sync.group,
            consumer = %config.lookup_sync.consumer,
            "Starting lookup sync consumer"
        );
        workers.push(tokio::spawn(consumer.run(coordinator.token())));
    } else {
        warn!("Lookup sync disabled; the lookup table will not follow user changes");
    }

    let sweeper = SessionSweeper::new(state.shared_context(), config.sessions.sweep_interval());
    workers.push(tokio::spawn(sweeper.run(coordinator.token())));

    Ok(workers)
}

/// Serve until the shutdown token fires
pub async fn run_server(app: Router, addr: SocketAddr, shutdown: ShutdownToken) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    let mut shutdown = shutdown;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run the complete service with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("invalid server address: {e}")))?;

    let infra = Infrastructure::connect(&config).await?;
    let state = create_app_state(config, &infra)?;

    let coordinator = Arc::new(ShutdownCoordinator::new());
    let workers = spawn_workers(&state, &infra, &coordinator).await?;

    let signals = Arc::clone(&coordinator);
    tokio::spawn(async move { signals.wait_for_signal().await });

    let served = run_server(create_app(state), addr, coordinator.token()).await;

    coordinator.shutdown();
    for worker in workers {
        if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await.is_err() {
            warn!("Background worker did not stop in time");
        }
    }
    info!("Shutdown complete");

    served
}
