//! Scheduled notification delivery.
//!
//! One tick: read candidates, filter by due policy, fetch rates once,
//! send to each due user. A storage or fetch failure aborts the whole
//! tick; a single user's send failure is contained to that user.

use crate::adapters::SqliteStore;
use crate::domain::Subscription;
use crate::error::Result;
use crate::traits::{RateSource, Transport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Counters for one tick, returned for logging and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct TickReport {
    /// Subscriptions read from the store
    pub candidates: usize,
    /// Subscriptions due at this tick's timestamp
    pub due: usize,
    /// Messages delivered
    pub delivered: usize,
    /// Sends that failed (isolated, already logged)
    pub failed: usize,
}

/// Delivers rate notifications to all users due at a given instant
pub struct NotificationDispatcher {
    store: SqliteStore,
    rates: Arc<dyn RateSource>,
    transport: Arc<dyn Transport>,
}

impl NotificationDispatcher {
    pub fn new(
        store: SqliteStore,
        rates: Arc<dyn RateSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            store,
            rates,
            transport,
        }
    }

    /// Run one delivery tick evaluated at `now`.
    ///
    /// Exactly zero or one rate fetch happens per tick: zero when nobody
    /// is due, one shared snapshot otherwise. Errors from the store read
    /// or the fetch abort the tick with nothing sent; the next matching
    /// tick starts from scratch (no catch-up, no retry within the tick).
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickReport> {
        let candidates = self.store.list_due_candidates().await?;

        let due: Vec<Subscription> = candidates
            .iter()
            .copied()
            .filter(|s| s.period.is_due(now))
            .collect();

        let mut report = TickReport {
            candidates: candidates.len(),
            due: due.len(),
            ..TickReport::default()
        };

        if due.is_empty() {
            debug!(
                "No users due at {} ({} candidates)",
                now,
                report.candidates
            );
            return Ok(report);
        }

        let snapshot = match self.rates.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(
                    "Rates unavailable, skipping delivery to {} due users: {}",
                    report.due, e
                );
                return Err(e);
            }
        };

        let text = snapshot.notification_text();

        for subscription in &due {
            match self.transport.send_message(subscription.user_id, &text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "Failed to notify user {}: {}",
                        subscription.user_id, e
                    );
                }
            }
        }

        Ok(report)
    }
}
