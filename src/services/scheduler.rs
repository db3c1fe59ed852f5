//! Repeating tick loop driving the notification dispatcher.

use crate::config::SchedulerConfig;
use crate::services::NotificationDispatcher;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

/// Owns the process-wide repeating timer for notification delivery.
///
/// Single timeline: each tick is awaited to completion before the next
/// interval fires, so ticks never overlap. The store is read-only during
/// a tick, so an in-flight tick abandoned at shutdown cannot corrupt it.
pub struct Scheduler {
    dispatcher: Arc<NotificationDispatcher>,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(dispatcher: Arc<NotificationDispatcher>, config: SchedulerConfig) -> Self {
        Self {
            dispatcher,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the tick loop.
    ///
    /// Waits out the initial delay (letting the transport finish its own
    /// startup), then ticks at the configured interval. Any single tick's
    /// failure is logged and the loop keeps going.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Notification scheduler already running");
            return;
        }

        info!(
            "Starting notification scheduler (interval: {}s, initial delay: {}s)",
            self.config.tick_interval_secs, self.config.initial_delay_secs
        );

        let dispatcher = self.dispatcher.clone();
        let config = self.config.clone();
        let running = self.running.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(config.initial_delay_secs)).await;

            let mut interval =
                tokio::time::interval(Duration::from_secs(config.tick_interval_secs));

            while running.load(Ordering::SeqCst) {
                interval.tick().await;

                match dispatcher.run_tick(Utc::now()).await {
                    Ok(report) if report.due > 0 => {
                        info!(
                            "Tick complete: {} due, {} delivered, {} failed",
                            report.due, report.delivered, report.failed
                        );
                    }
                    Ok(report) => {
                        debug!("Tick complete: no users due ({} candidates)", report.candidates);
                    }
                    Err(e) => {
                        error!("Notification tick failed: {}", e);
                    }
                }
            }

            info!("Notification scheduler stopped");
        });
    }

    /// Request the loop to stop; an in-flight tick finishes first.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("Notification scheduler stop requested");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
