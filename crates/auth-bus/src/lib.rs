//! # auth-bus
//!
//! Message bus layer for the authentication service.
//!
//! - **pool** - Redis connection pool (deadpool-redis)
//! - **streams** - consumer group over a Redis Stream, implementing
//!   [`auth_core::EventSource`] with reclaim and dead-lettering, plus a publisher

pub mod pool;
pub mod streams;

pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use streams::{RedisStreamSource, StreamConfig, StreamPublisher, EVENT_FIELD};
