//! [`EventSource`] backed by a Redis Stream consumer group.
//!
//! Each stream entry carries one serialized event envelope in the `event` field.
//! Entries stay in the group's pending list until acknowledged, so a consumer that
//! crashes mid-batch loses nothing: once an entry has been idle longer than
//! `reclaim_idle_ms` another fetch claims it again with an incremented delivery count.

use async_trait::async_trait;
use redis::streams::{
    StreamClaimReply, StreamId, StreamPendingCountReply, StreamReadOptions, StreamReadReply,
};
use redis::AsyncCommands;
use tracing::{debug, instrument, warn};

use auth_core::{BusError, Delivery, EventSource};

use crate::pool::{RedisPool, RedisPoolError, RedisResult};

/// Stream entry field holding the JSON envelope
pub const EVENT_FIELD: &str = "event";

/// Where and as whom the consumer reads
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub stream: String,
    pub group: String,
    pub consumer: String,
    pub block_ms: u64,
    pub reclaim_idle_ms: u64,
    pub dead_letter_stream: String,
}

impl From<&auth_common::LookupSyncConfig> for StreamConfig {
    fn from(config: &auth_common::LookupSyncConfig) -> Self {
        Self {
            stream: config.stream.clone(),
            group: config.group.clone(),
            consumer: config.consumer.clone(),
            block_ms: config.block_ms,
            reclaim_idle_ms: config.reclaim_idle_ms,
            dead_letter_stream: config.dead_letter_stream(),
        }
    }
}

/// Consumer-group reader over one Redis Stream
#[derive(Debug, Clone)]
pub struct RedisStreamSource {
    pool: RedisPool,
    config: StreamConfig,
}

impl RedisStreamSource {
    pub fn new(pool: RedisPool, config: StreamConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Create the stream and consumer group if they do not exist yet.
    ///
    /// The group starts at the beginning of the stream, so events published
    /// before the first deployment are still applied.
    #[instrument(skip(self), fields(stream = %self.config.stream, group = %self.config.group))]
    pub async fn ensure_group(&self) -> RedisResult<()> {
        let mut conn = self.pool.get().await?;
        let created: Result<(), redis::RedisError> = conn
            .xgroup_create_mkstream(&self.config.stream, &self.config.group, "0")
            .await;

        match created {
            Ok(()) => {
                debug!("Consumer group created");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(RedisPoolError::Redis(e)),
        }
    }

    /// Claim entries another consumer received but never acknowledged.
    async fn reclaim(&self, max: usize) -> RedisResult<Vec<Delivery>> {
        let mut conn = self.pool.get().await?;
        let pending: StreamPendingCountReply = conn
            .xpending_count(&self.config.stream, &self.config.group, "-", "+", max)
            .await?;

        let stale: Vec<_> = pending
            .ids
            .into_iter()
            .filter(|p| p.last_delivered_ms as u64 >= self.config.reclaim_idle_ms)
            .collect();
        if stale.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = stale.iter().map(|p| p.id.as_str()).collect();
        let claimed: StreamClaimReply = conn
            .xclaim(
                &self.config.stream,
                &self.config.group,
                &self.config.consumer,
                self.config.reclaim_idle_ms,
                &ids[..],
            )
            .await?;

        let deliveries = claimed
            .ids
            .into_iter()
            .map(|entry| {
                let attempts = stale
                    .iter()
                    .find(|p| p.id == entry.id)
                    .map_or(1, |p| p.times_delivered as u64 + 1);
                to_delivery(entry, attempts)
            })
            .collect::<Vec<_>>();

        if !deliveries.is_empty() {
            warn!(count = deliveries.len(), "Reclaimed unacknowledged stream entries");
        }
        Ok(deliveries)
    }

    /// Block for up to `block_ms` waiting for entries never delivered to the group.
    async fn read_new(&self, max: usize) -> RedisResult<Vec<Delivery>> {
        let mut conn = self.pool.get().await?;
        let options = StreamReadOptions::default()
            .group(&self.config.group, &self.config.consumer)
            .count(max)
            .block(self.config.block_ms as usize);

        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.config.stream], &[">"], &options)
            .await?;

        Ok(reply
            .map(|r| {
                r.keys
                    .into_iter()
                    .flat_map(|key| key.ids)
                    .map(|entry| to_delivery(entry, 1))
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn to_delivery(entry: StreamId, attempts: u64) -> Delivery {
    // A missing field yields an empty payload, which fails decoding and is dead-lettered.
    let payload = entry.get::<Vec<u8>>(EVENT_FIELD).unwrap_or_default();
    Delivery {
        id: entry.id,
        payload,
        attempts,
    }
}

#[async_trait]
impl EventSource for RedisStreamSource {
    #[instrument(skip(self), fields(stream = %self.config.stream))]
    async fn fetch(&self, max: usize) -> Result<Vec<Delivery>, BusError> {
        let reclaimed = self.reclaim(max).await?;
        if !reclaimed.is_empty() {
            return Ok(reclaimed);
        }
        Ok(self.read_new(max).await?)
    }

    #[instrument(skip(self), fields(stream = %self.config.stream))]
    async fn ack(&self, id: &str) -> Result<(), BusError> {
        let mut conn = self.pool.get().await.map_err(BusError::from)?;
        let _: u64 = conn
            .xack(&self.config.stream, &self.config.group, &[id])
            .await
            .map_err(|e| BusError::from(RedisPoolError::Redis(e)))?;
        Ok(())
    }

    #[instrument(skip(self, delivery), fields(id = %delivery.id, attempts = delivery.attempts))]
    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError> {
        let mut conn = self.pool.get().await.map_err(BusError::from)?;
        let payload = String::from_utf8_lossy(&delivery.payload).into_owned();
        let attempts = delivery.attempts.to_string();
        let fields = [
            (EVENT_FIELD, payload.as_str()),
            ("reason", reason),
            ("source_id", delivery.id.as_str()),
            ("attempts", attempts.as_str()),
        ];

        redis::pipe()
            .atomic()
            .xadd(&self.config.dead_letter_stream, "*", &fields[..])
            .ignore()
            .xack(&self.config.stream, &self.config.group, &[&delivery.id])
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| BusError::from(RedisPoolError::Redis(e)))?;

        warn!(
            dead_letter_stream = %self.config.dead_letter_stream,
            reason,
            "Event moved to dead-letter stream"
        );
        Ok(())
    }
}
