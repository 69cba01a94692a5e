//! Appends event envelopes to a Redis Stream.

use auth_core::EventEnvelope;
use redis::AsyncCommands;
use tracing::{debug, instrument};

use super::source::EVENT_FIELD;
use crate::pool::{RedisPool, RedisResult};

/// Writes envelopes in the same shape the consumer group reads
#[derive(Debug, Clone)]
pub struct StreamPublisher {
    pool: RedisPool,
    stream: String,
}

impl StreamPublisher {
    pub fn new(pool: RedisPool, stream: impl Into<String>) -> Self {
        Self {
            pool,
            stream: stream.into(),
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Publish one envelope, returning the stream entry id
    #[instrument(skip(self, envelope), fields(stream = %self.stream, event_type = %envelope.event_type))]
    pub async fn publish(&self, envelope: &EventEnvelope) -> RedisResult<String> {
        let payload = serde_json::to_string(envelope)?;
        let mut conn = self.pool.get().await?;
        let id: String = conn
            .xadd(&self.stream, "*", &[(EVENT_FIELD, payload.as_str())])
            .await?;
        debug!(entry_id = %id, "Event published");
        Ok(id)
    }
}
