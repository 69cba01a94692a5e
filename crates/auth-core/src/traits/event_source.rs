use async_trait::async_trait;

use crate::error::BusError;

/// A message handed to a consumer, not yet acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Bus-assigned message id, used to ack
    pub id: String,
    /// Raw envelope bytes
    pub payload: Vec<u8>,
    /// How many times this message has been delivered, including this one
    pub attempts: u64,
}

/// At-least-once message source with explicit acknowledgement.
///
/// Messages that are fetched but never acked are delivered again later.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Wait briefly for new or reclaimable messages, returning at most `max`
    async fn fetch(&self, max: usize) -> Result<Vec<Delivery>, BusError>;

    /// Mark a message as processed
    async fn ack(&self, id: &str) -> Result<(), BusError>;

    /// Park a message that will never succeed, then ack it
    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError>;
}
