//! Lookup table projection of user lifecycle events
//!
//! [`LookupSyncHandler`] applies one decoded event to the lookup repository.
//! [`LookupSyncConsumer`] drains an [`EventSource`] and decides, per delivery, whether
//! to ack, leave it pending for redelivery, or dead-letter it.
//!
//! Every handler operation is idempotent, so redelivery after a crash between apply and
//! ack is harmless.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use auth_common::ShutdownToken;
use auth_core::entities::LookupEntry;
use auth_core::events::{
    EventEnvelope, UserCreatedEvent, UserDeletedEvent, UserEvent, UserUpdatedEvent,
};
use auth_core::traits::{Delivery, EventSource, LookupRepository};
use auth_core::DomainError;

use super::error::ServiceResult;

/// Pause after a failed fetch before polling the bus again
const FETCH_RETRY_DELAY: Duration = Duration::from_secs(1);

/// What the handler did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The lookup table changed (or was already in the target state)
    Applied,
    /// Nothing to do for this event
    Ignored,
    /// The event could not be applied and retrying will not help
    Skipped,
}

/// What the consumer did with a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Acked,
    /// Left pending; the bus redelivers it later
    Retry,
    DeadLettered,
}

pub struct LookupSyncHandler {
    lookup: Arc<dyn LookupRepository>,
}

impl LookupSyncHandler {
    pub fn new(lookup: Arc<dyn LookupRepository>) -> Self {
        Self { lookup }
    }

    #[instrument(skip(self, event), fields(event_type = event.event_type()))]
    pub async fn handle(&self, event: &UserEvent) -> ServiceResult<SyncOutcome> {
        match event {
            UserEvent::Created(created) => self.user_created(created).await,
            UserEvent::Updated(updated) => self.user_updated(updated).await,
            UserEvent::Deleted(deleted) => self.user_deleted(deleted).await,
            UserEvent::Unknown(event_type) => {
                debug!(event_type = %event_type, "Ignoring unhandled event type");
                Ok(SyncOutcome::Ignored)
            }
        }
    }

    async fn user_created(&self, event: &UserCreatedEvent) -> ServiceResult<SyncOutcome> {
        let tenant = event
            .tenant()
            .ok_or_else(|| DomainError::MissingTenantContext(event.user_id.to_string()))?;

        let entry = LookupEntry::new(&event.email, event.username.as_deref(), event.user_id, &tenant);
        self.lookup.upsert(&entry).await?;

        info!(user_id = %event.user_id, tenant = %tenant, "Lookup entry created");
        Ok(SyncOutcome::Applied)
    }

    /// Only email changes touch the lookup table.
    ///
    /// The new row keeps the username of the old row. When the event carries no tenant,
    /// the old row's tenant is used.
    async fn user_updated(&self, event: &UserUpdatedEvent) -> ServiceResult<SyncOutcome> {
        let Some((old_email, new_email)) = event.email_change() else {
            debug!(user_id = %event.user_id, "Update without email change");
            return Ok(SyncOutcome::Ignored);
        };

        let existing = self.lookup.find_by_email(old_email).await?;
        let Some(tenant) = event
            .tenant()
            .or_else(|| existing.as_ref().map(LookupEntry::tenant))
        else {
            warn!(
                user_id = %event.user_id,
                "Email change for a user with no known tenant, skipping"
            );
            return Ok(SyncOutcome::Skipped);
        };

        let username = existing.as_ref().and_then(|row| row.username.as_deref());
        let entry = LookupEntry::new(new_email, username, event.user_id, &tenant);
        self.lookup.replace_email(old_email, &entry).await?;

        info!(user_id = %event.user_id, tenant = %tenant, "Lookup entry email changed");
        Ok(SyncOutcome::Applied)
    }

    async fn user_deleted(&self, event: &UserDeletedEvent) -> ServiceResult<SyncOutcome> {
        let mut removed = match event.email.as_deref() {
            Some(email) => self.lookup.delete_by_email(email).await?,
            None => 0,
        };
        if removed == 0 {
            removed = self.lookup.delete_by_user_id(event.user_id).await?;
        }

        if removed == 0 {
            debug!(user_id = %event.user_id, "Deleted user had no lookup entries");
            return Ok(SyncOutcome::Ignored);
        }
        info!(user_id = %event.user_id, removed, "Lookup entries deleted");
        Ok(SyncOutcome::Applied)
    }
}

/// Long-running consumer of the user event stream
pub struct LookupSyncConsumer {
    source: Arc<dyn EventSource>,
    handler: LookupSyncHandler,
    batch_size: usize,
    max_deliveries: u64,
}

impl LookupSyncConsumer {
    pub fn new(
        source: Arc<dyn EventSource>,
        handler: LookupSyncHandler,
        batch_size: usize,
        max_deliveries: u64,
    ) -> Self {
        Self {
            source,
            handler,
            batch_size: batch_size.max(1),
            max_deliveries: max_deliveries.max(1),
        }
    }

    /// Consume until shutdown. The delivery being processed when shutdown arrives is
    /// finished; the rest of its batch stays pending.
    pub async fn run(self, mut shutdown: ShutdownToken) {
        info!(
            batch_size = self.batch_size,
            max_deliveries = self.max_deliveries,
            "Lookup sync consumer started"
        );

        loop {
            let fetched = tokio::select! {
                () = shutdown.cancelled() => break,
                fetched = self.source.fetch(self.batch_size) => fetched,
            };

            match fetched {
                Ok(deliveries) => {
                    for delivery in &deliveries {
                        if shutdown.is_shutdown() {
                            break;
                        }
                        self.process(delivery).await;
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to fetch user events");
                    tokio::select! {
                        () = shutdown.cancelled() => break,
                        () = tokio::time::sleep(FETCH_RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Lookup sync consumer stopped");
    }

    /// Handle one delivery and settle it on the bus
    #[instrument(skip(self, delivery), fields(message_id = %delivery.id, attempts = delivery.attempts))]
    pub async fn process(&self, delivery: &Delivery) -> DeliveryOutcome {
        let event = match EventEnvelope::from_slice(&delivery.payload).and_then(|e| e.decode()) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Undecodable user event");
                return self.dead_letter(delivery, &e.to_string()).await;
            }
        };

        match self.handler.handle(&event).await {
            Ok(outcome) => {
                debug!(?outcome, "User event handled");
                self.ack(delivery).await
            }
            Err(e) if delivery.attempts >= self.max_deliveries => {
                error!(error = %e, "User event failed on final attempt");
                self.dead_letter(delivery, &e.to_string()).await
            }
            Err(e) => {
                warn!(error = %e, "User event failed, leaving it for redelivery");
                DeliveryOutcome::Retry
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> DeliveryOutcome {
        match self.source.ack(&delivery.id).await {
            Ok(()) => DeliveryOutcome::Acked,
            Err(e) => {
                error!(error = %e, "Failed to ack user event");
                DeliveryOutcome::Retry
            }
        }
    }

    async fn dead_letter(&self, delivery: &Delivery, reason: &str) -> DeliveryOutcome {
        match self.source.dead_letter(delivery, reason).await {
            Ok(()) => DeliveryOutcome::DeadLettered,
            Err(e) => {
                error!(error = %e, "Failed to dead-letter user event");
                DeliveryOutcome::Retry
            }
        }
    }
}
