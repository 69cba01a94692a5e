//! Redis Streams carrying user lifecycle events.

mod publisher;
mod source;

pub use publisher::StreamPublisher;
pub use source::{RedisStreamSource, StreamConfig, EVENT_FIELD};
