//! # auth-api
//!
//! REST API for the tenant-aware authentication service, built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server, spawn_workers, Infrastructure};
pub use state::{AppState, BackendProbe, ReadinessProbe};
