//! # auth-db
//!
//! Database layer implementing the auth-core repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! - Connection pool management
//! - Idempotent schema bootstrap for the lookup, session and blacklist tables
//! - Database models with SQLx `FromRow` derives and their entity mappers
//! - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth_db::{create_pool, ensure_schema, DatabaseConfig, PgLookupRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default()).await?;
//!     ensure_schema(&pool).await?;
//!     let lookups = PgLookupRepository::new(pool);
//!     Ok(())
//! }
//! ```

mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, ping, DatabaseConfig, PgPool};
pub use repositories::{PgLookupRepository, PgSessionRepository, PgTokenBlacklistRepository};
pub use schema::ensure_schema;
