//! Periodic inactivity eviction.

use crate::notify::{Evicted, EvictionSink};
use crate::session::SharedSessions;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Outcome of a single reaper pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entries examined
    pub scanned: usize,
    /// Entries removed, in scan order
    pub evicted: Vec<Evicted>,
    /// Notifications the sink rejected
    pub failed_notifications: usize,
}

/// Cadence used when a zero interval is requested.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Scans the membership table on a fixed cadence and removes members whose
/// inactivity window has run out.
pub struct InactivityReaper {
    sessions: SharedSessions,
    sink: Arc<dyn EvictionSink>,
    interval: Duration,
}

impl InactivityReaper {
    /// A zero `interval` is replaced by [`DEFAULT_INTERVAL`].
    pub fn new(sessions: SharedSessions, sink: Arc<dyn EvictionSink>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                default_secs = DEFAULT_INTERVAL.as_secs(),
                "Reaper interval must be positive, using default"
            );
            DEFAULT_INTERVAL
        } else {
            interval
        };

        Self {
            sessions,
            sink,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one pass against the wall clock.
    pub async fn tick(&self) -> TickReport {
        self.tick_at(Utc::now()).await
    }

    /// Run one pass as of `now`.
    ///
    /// The table lock covers the scan and the removals only; the sink is
    /// called after it is released.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        {
            let mut table = self.sessions.lock().await;
            if table.is_empty() {
                return report;
            }

            let snapshot = table.snapshot();
            report.scanned = snapshot.len();

            for entry in &snapshot {
                if table.advance(entry.id(), now) != Some(true) {
                    continue;
                }
                if table.remove(entry.id()) {
                    report.evicted.push(Evicted {
                        id: entry.id().to_string(),
                        occupancy: table.remaining_capacity(),
                    });
                }
            }
        }

        for evicted in &report.evicted {
            tracing::info!(
                user_id = %evicted.id,
                occupancy = %evicted.occupancy,
                "Evicted inactive member"
            );
            if let Err(e) = self.sink.notify(evicted).await {
                report.failed_notifications += 1;
                tracing::warn!(user_id = %evicted.id, error = %e, "Failed to deliver eviction notice");
            }
        }

        if !report.evicted.is_empty() {
            tracing::debug!(
                scanned = report.scanned,
                evicted = report.evicted.len(),
                failed = report.failed_notifications,
                "Reaper pass complete"
            );
        }

        report
    }

    /// Run passes forever on the configured interval.
    ///
    /// The first pass happens one interval after the call. Abort the returned
    /// handle to stop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(interval_secs = period.as_secs(), "Inactivity reaper started");

            loop {
                ticker.tick().await;
                self.tick().await;
            }
        })
    }
}
