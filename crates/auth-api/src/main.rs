//! Tenant auth service entry point
//!
//! Run with:
//! ```bash
//! cargo run -p auth-api --bin tenant-auth
//! ```
//!
//! Configuration is loaded from environment variables (and `.env` when present).

use auth_common::{try_init_tracing_with_config, AppConfig, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env();

    let env = config.as_ref().map_or(Environment::default(), |c| c.app.env);
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        env = ?config.app.env,
        address = %config.server.address(),
        lookup_sync = config.lookup_sync.enabled,
        "Starting tenant auth service"
    );

    if let Err(e) = auth_api::run(config).await {
        error!(error = %e, "Service failed");
        std::process::exit(1);
    }
}
