//! At-least-once event source held in memory.
//!
//! Fetched but unacknowledged messages come back on the next fetch with their
//! attempt counter bumped, which is what the Redis source does once an entry has
//! been idle past the reclaim threshold.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use auth_core::error::BusError;
use auth_core::events::EventEnvelope;
use auth_core::traits::{Delivery, EventSource};

const EMPTY_POLL_DELAY: Duration = Duration::from_millis(5);

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    queue: VecDeque<Delivery>,
    in_flight: Vec<Delivery>,
    acked: Vec<String>,
    dead: Vec<(Delivery, String)>,
}

#[derive(Debug, Default)]
pub struct InMemoryEventSource {
    state: Mutex<State>,
}

impl InMemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an envelope; returns the message id
    pub fn push(&self, envelope: &EventEnvelope) -> String {
        let payload = serde_json::to_vec(envelope).unwrap_or_default();
        self.push_raw(payload)
    }

    /// Enqueue arbitrary bytes; returns the message id
    pub fn push_raw(&self, payload: impl Into<Vec<u8>>) -> String {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = format!("{}-0", state.next_id);
        state.queue.push_back(Delivery {
            id: id.clone(),
            payload: payload.into(),
            attempts: 0,
        });
        id
    }

    pub fn acked(&self) -> Vec<String> {
        self.state.lock().acked.clone()
    }

    /// Dead-lettered messages with their reasons
    pub fn dead_letters(&self) -> Vec<(Delivery, String)> {
        self.state.lock().dead.clone()
    }

    /// Messages not yet acknowledged, queued or in flight
    pub fn pending(&self) -> usize {
        let state = self.state.lock();
        state.queue.len() + state.in_flight.len()
    }
}

#[async_trait]
impl EventSource for InMemoryEventSource {
    async fn fetch(&self, max: usize) -> Result<Vec<Delivery>, BusError> {
        let batch = {
            let mut state = self.state.lock();

            let mut batch: Vec<Delivery> = state
                .in_flight
                .iter_mut()
                .take(max)
                .map(|d| {
                    d.attempts += 1;
                    d.clone()
                })
                .collect();

            while batch.len() < max {
                let Some(mut delivery) = state.queue.pop_front() else {
                    break;
                };
                delivery.attempts = 1;
                state.in_flight.push(delivery.clone());
                batch.push(delivery);
            }
            batch
        };

        if batch.is_empty() {
            tokio::time::sleep(EMPTY_POLL_DELAY).await;
        }
        Ok(batch)
    }

    async fn ack(&self, id: &str) -> Result<(), BusError> {
        let mut state = self.state.lock();
        state.in_flight.retain(|d| d.id != id);
        state.acked.push(id.to_string());
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> Result<(), BusError> {
        self.state
            .lock()
            .dead
            .push((delivery.clone(), reason.to_string()));
        self.ack(&delivery.id).await
    }
}
