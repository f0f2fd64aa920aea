//! Elapsed-time display while a run is in flight.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Format a duration as `m:ss`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Periodically reports the elapsed time until stopped or dropped.
///
/// The first tick fires immediately. Must be created inside a tokio runtime.
pub struct ElapsedTicker {
    start: Instant,
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(Duration) + Send + 'static,
    {
        debug_assert!(!period.is_zero(), "Tick period must be non-zero");

        let start = Instant::now();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick(start.elapsed());
            }
        });

        Self { start, handle }
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop ticking and return the final elapsed time.
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
