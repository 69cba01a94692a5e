//! # auth-common
//!
//! Shared utilities including configuration, the error taxonomy, token handling,
//! telemetry and shutdown coordination.

pub mod auth;
pub mod config;
pub mod error;
pub mod shutdown;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    AccessClaims, IssuedTokens, JwtService, RefreshClaims, RegisteredClaims, TenantClaims,
    TokenPair, TokenType,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LookupSyncConfig, RateLimitConfig, RedisConfig, ServerConfig, SessionConfig,
    UserServiceConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use shutdown::{shutdown_signal, ShutdownCoordinator, ShutdownToken};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
