//! Integration test utilities for tenant-auth
//!
//! Runs the REST API on a real socket against a stub user service, with either
//! in-memory storage or live Postgres and Redis.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
