use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Timelike};
use futures_util::StreamExt;
use snapshot_db::Database;
use snapshot_types::UserId;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::clock::Clock;
use crate::compiler::SnapshotCompiler;
use crate::delivery::DeliveryGateway;
use crate::{SnapshotError, blocking};

pub const DEFAULT_SCOPE: &str = "daily";

#[derive(Debug, Clone)]
pub struct RecapConfig {
    /// Hour of day (reference timezone) during which the recap may fire.
    pub recap_hour: u32,
    pub poll_interval: Duration,
    /// Upper bound on deliveries in flight at once.
    pub concurrency: usize,
    /// Cursor key; one cursor per scope.
    pub scope: String,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            recap_hour: 21,
            poll_interval: Duration::from_secs(60),
            concurrency: 4,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }
}

/// What one poll did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecapOutcome {
    /// The cursor already holds today.
    AlreadyFired { date: NaiveDate },
    OutsideRecapHour { hour: u32 },
    Triggered {
        date: NaiveDate,
        users: usize,
        delivered: usize,
        failed: usize,
    },
}

/// Fires the daily recap at most once per civil day.
///
/// A periodic poll checks the hour; the durable recap cursor collapses every
/// poll inside the recap hour, and every restart, into one trigger per day.
/// The cursor is written before delivery starts, so a crash mid-recap skips
/// the remaining users rather than sending anyone a second card.
pub struct RecapScheduler {
    db: Arc<Database>,
    clock: Arc<dyn Clock>,
    compiler: SnapshotCompiler,
    gateway: Arc<dyn DeliveryGateway>,
    config: RecapConfig,
    last_triggered: Option<NaiveDate>,
}

impl RecapScheduler {
    /// Loads the recap cursor from the store.
    pub async fn new(
        db: Arc<Database>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn DeliveryGateway>,
        config: RecapConfig,
    ) -> Result<Self, SnapshotError> {
        let scope = config.scope.clone();
        let store = db.clone();
        let last_triggered = blocking(move || store.get_recap_cursor(&scope)).await?;

        if let Some(date) = last_triggered {
            info!("Recap cursor loaded: last recap on {}", date);
        }

        Ok(Self {
            compiler: SnapshotCompiler::new(db.clone()),
            db,
            clock,
            gateway,
            config,
            last_triggered,
        })
    }

    pub fn last_triggered(&self) -> Option<NaiveDate> {
        self.last_triggered
    }

    /// Poll forever on the configured interval. Errors abort only the current
    /// cycle; the next tick tries again.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match self.poll_once().await {
                Ok(RecapOutcome::Triggered { date, users, delivered, failed }) => {
                    info!(
                        "Daily recap for {} complete: {} users, {} delivered, {} failed",
                        date, users, delivered, failed
                    );
                }
                Ok(outcome) => debug!(?outcome, "Recap poll"),
                Err(e) => error!("Recap cycle aborted: {}", e),
            }
        }
    }

    /// One pass of the Idle -> Checking -> (Triggering | Idle) cycle.
    pub async fn poll_once(&mut self) -> Result<RecapOutcome, SnapshotError> {
        let now = self.clock.now();
        let today = now.date_naive();

        if self.last_triggered == Some(today) {
            return Ok(RecapOutcome::AlreadyFired { date: today });
        }

        let hour = now.hour();
        if hour != self.config.recap_hour {
            return Ok(RecapOutcome::OutsideRecapHour { hour });
        }

        self.trigger(today).await
    }

    async fn trigger(&mut self, today: NaiveDate) -> Result<RecapOutcome, SnapshotError> {
        // Enumerate first: a failure here leaves the cursor untouched and the
        // day eligible on the next poll.
        let store = self.db.clone();
        let users = blocking(move || store.list_users_active_on(today)).await?;

        let store = self.db.clone();
        let scope = self.config.scope.clone();
        blocking(move || store.set_recap_cursor(&scope, today)).await?;
        self.last_triggered = Some(today);

        info!("Starting daily recap for {} ({} users)", today, users.len());

        let results: Vec<bool> = futures_util::stream::iter(users.iter().copied())
            .map(|user_id| self.deliver_one(user_id, today))
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let delivered = results.iter().filter(|ok| **ok).count();
        Ok(RecapOutcome::Triggered {
            date: today,
            users: users.len(),
            delivered,
            failed: results.len() - delivered,
        })
    }

    /// Compile and deliver for one user. Failures are logged and contained.
    async fn deliver_one(&self, user_id: UserId, date: NaiveDate) -> bool {
        let snapshot = match self.compiler.compile_async(user_id, date).await {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to compile recap for user {}: {}", user_id, e);
                return false;
            }
        };

        match self.gateway.deliver(user_id, &snapshot).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to deliver recap to user {}: {}", user_id, e);
                false
            }
        }
    }
}
