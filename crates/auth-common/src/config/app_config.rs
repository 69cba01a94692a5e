//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub user_service: UserServiceConfig,
    pub lookup_sync: LookupSyncConfig,
    pub sessions: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration (token lifetimes in seconds)
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Where the user service lives and how long to wait for it
#[derive(Debug, Clone, Deserialize)]
pub struct UserServiceConfig {
    pub base_url: String,
    #[serde(default = "default_user_service_timeout_ms")]
    pub timeout_ms: u64,
}

impl UserServiceConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Consumer-group settings for the user event stream
#[derive(Debug, Clone, Deserialize)]
pub struct LookupSyncConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_stream")]
    pub stream: String,
    #[serde(default = "default_group")]
    pub group: String,
    #[serde(default = "default_consumer")]
    pub consumer: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,
    #[serde(default = "default_reclaim_idle_ms")]
    pub reclaim_idle_ms: u64,
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: u64,
}

impl LookupSyncConfig {
    /// Stream that receives events which will never be processed
    #[must_use]
    pub fn dead_letter_stream(&self) -> String {
        format!("{}.dead", self.stream)
    }
}

/// Session housekeeping
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl SessionConfig {
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "tenant-auth".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_issuer() -> String {
    "tenant-auth".to_string()
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_user_service_url() -> String {
    "http://127.0.0.1:8082".to_string()
}

fn default_user_service_timeout_ms() -> u64 {
    5_000
}

fn default_true() -> bool {
    true
}

fn default_stream() -> String {
    "user.events".to_string()
}

fn default_group() -> String {
    "auth-service.user-events".to_string()
}

fn default_consumer() -> String {
    format!("auth-{}", std::process::id())
}

fn default_batch_size() -> usize {
    16
}

fn default_block_ms() -> u64 {
    2_000
}

fn default_reclaim_idle_ms() -> u64 {
    30_000
}

fn default_max_deliveries() -> u64 {
    3
}

fn default_sweep_interval_secs() -> u64 {
    3_600
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

/// Parse an optional variable, falling back to `default` when unset.
///
/// A set but unparsable value is an error rather than silently defaulted.
fn env_parse<T: FromStr>(name: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default()),
    }
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing, a value does not
    /// parse, or the resulting configuration is inconsistent
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let config = Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            server: ServerConfig {
                host: env::var("AUTH_HOST").unwrap_or_else(|_| default_host()),
                port: env_parse("AUTH_PORT", default_port)?,
            },
            database: DatabaseConfig {
                url: env_required("DATABASE_URL")?,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                acquire_timeout_secs: env_parse(
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    default_acquire_timeout_secs,
                )?,
            },
            redis: RedisConfig {
                url: env_required("REDIS_URL")?,
                max_connections: env_parse("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            },
            jwt: JwtConfig {
                secret: env_required("JWT_SECRET")?,
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| default_issuer()),
                access_token_expiry: env_parse("JWT_ACCESS_TOKEN_EXPIRY", default_access_token_expiry)?,
                refresh_token_expiry: env_parse(
                    "JWT_REFRESH_TOKEN_EXPIRY",
                    default_refresh_token_expiry,
                )?,
            },
            user_service: UserServiceConfig {
                base_url: env::var("USER_SERVICE_URL")
                    .unwrap_or_else(|_| default_user_service_url()),
                timeout_ms: env_parse("USER_SERVICE_TIMEOUT_MS", default_user_service_timeout_ms)?,
            },
            lookup_sync: LookupSyncConfig {
                enabled: env_parse("LOOKUP_SYNC_ENABLED", default_true)?,
                stream: env::var("LOOKUP_SYNC_STREAM").unwrap_or_else(|_| default_stream()),
                group: env::var("LOOKUP_SYNC_GROUP").unwrap_or_else(|_| default_group()),
                consumer: env::var("LOOKUP_SYNC_CONSUMER").unwrap_or_else(|_| default_consumer()),
                batch_size: env_parse("LOOKUP_SYNC_BATCH_SIZE", default_batch_size)?,
                block_ms: env_parse("LOOKUP_SYNC_BLOCK_MS", default_block_ms)?,
                reclaim_idle_ms: env_parse("LOOKUP_SYNC_RECLAIM_IDLE_MS", default_reclaim_idle_ms)?,
                max_deliveries: env_parse("LOOKUP_SYNC_MAX_DELIVERIES", default_max_deliveries)?,
            },
            sessions: SessionConfig {
                sweep_interval_secs: env_parse(
                    "SESSION_SWEEP_INTERVAL_SECS",
                    default_sweep_interval_secs,
                )?,
            },
            rate_limit: RateLimitConfig {
                enabled: env_parse("RATE_LIMIT_ENABLED", bool::default)?,
                requests_per_second: env_parse(
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: env_parse("RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate(self.app.env)?;

        if self.lookup_sync.max_deliveries == 0 {
            return Err(ConfigError::InvalidValue(
                "LOOKUP_SYNC_MAX_DELIVERIES",
                "must be at least 1".to_string(),
            ));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "SESSION_SWEEP_INTERVAL_SECS",
                "must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl JwtConfig {
    /// Minimum secret length accepted in production
    pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

    pub fn validate(&self, env: Environment) -> Result<(), ConfigError> {
        if self.access_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "JWT_ACCESS_TOKEN_EXPIRY",
                "must be positive".to_string(),
            ));
        }
        if self.refresh_token_expiry <= self.access_token_expiry {
            return Err(ConfigError::InvalidValue(
                "JWT_REFRESH_TOKEN_EXPIRY",
                "must be longer than the access token expiry".to_string(),
            ));
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "JWT_ISSUER",
                "must not be empty".to_string(),
            ));
        }
        if env.is_production() && self.secret.len() < Self::MIN_PRODUCTION_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "JWT_SECRET",
                format!(
                    "must be at least {} bytes in production",
                    Self::MIN_PRODUCTION_SECRET_LEN
                ),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
