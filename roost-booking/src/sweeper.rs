use std::sync::Arc;

use chrono::Duration;
use roost_core::Clock;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::lifecycle::BookingLifecycle;

/// Periodic reclaim of abandoned reservations.
///
/// Single-flight: a tick that finds the previous sweep still running skips
/// instead of queueing, so two sweeps can never double-release the same
/// room. The per-booking status re-check inside `expire_pending` is the
/// idempotency backstop regardless. A failed tick logs and leaves its work
/// for the next one.
pub struct ExpirationSweeper {
    lifecycle: Arc<BookingLifecycle>,
    clock: Arc<dyn Clock>,
    hold_duration: Duration,
    interval: std::time::Duration,
    running: Mutex<()>,
}

impl ExpirationSweeper {
    pub fn new(
        lifecycle: Arc<BookingLifecycle>,
        clock: Arc<dyn Clock>,
        hold_duration: Duration,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            lifecycle,
            clock,
            hold_duration,
            interval,
            running: Mutex::new(()),
        }
    }

    /// Timer loop; runs until the task is dropped.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "expiration sweeper started");

        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// One sweep. Returns the number of bookings expired, or `None` when
    /// the tick was skipped (previous sweep still running) or failed.
    pub async fn sweep_once(&self) -> Option<usize> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::debug!("previous sweep still running, skipping tick");
            return None;
        };

        let cutoff = self.clock.now() - self.hold_duration;
        match self.lifecycle.expire_pending(cutoff).await {
            Ok(0) => Some(0),
            Ok(expired) => {
                tracing::info!(expired, "reclaimed stale pending bookings");
                Some(expired)
            }
            Err(err) => {
                tracing::error!(error = %err, "expiration sweep failed, will retry next tick");
                None
            }
        }
    }
}
