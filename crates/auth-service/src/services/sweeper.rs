//! Periodic cleanup of dead sessions and expired blacklist rows

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use auth_common::ShutdownToken;

use super::context::ServiceContext;
use super::session::SessionService;

pub struct SessionSweeper {
    ctx: Arc<ServiceContext>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(ctx: Arc<ServiceContext>, interval: Duration) -> Self {
        Self { ctx, interval }
    }

    /// One cleanup pass; returns `(sessions, blacklist rows)` removed
    pub async fn sweep_once(&self) -> (u64, u64) {
        let sessions = SessionService::new(&self.ctx);

        let removed_sessions = sessions.clean_expired().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to clean expired sessions");
            0
        });
        let removed_blacklist = sessions.purge_blacklist().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to purge token blacklist");
            0
        });

        if removed_sessions > 0 || removed_blacklist > 0 {
            info!(removed_sessions, removed_blacklist, "Session sweep finished");
        } else {
            debug!("Session sweep found nothing to remove");
        }
        (removed_sessions, removed_blacklist)
    }

    pub async fn run(self, mut shutdown: ShutdownToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "Session sweeper started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        info!("Session sweeper stopped");
    }
}
