//! Poll loop for queue position monitoring
//!
//! Reads the log, feeds the tracker and sleeps for a fixed interval, forever.
//! Ticks run strictly one after another on the calling task.

use super::log_watcher::{PositionReader, QueuePosition};
use super::tracker::PositionTracker;
use crate::notifier::NotificationSink;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Drives the tracker from the log file on a fixed interval
pub struct QueueMonitor<S: NotificationSink> {
    /// Log file reader
    reader: PositionReader,
    /// Position state machine
    tracker: PositionTracker,
    /// Notification destination
    sink: S,
    /// Delay between polls
    poll_interval: Duration,
}

impl<S: NotificationSink> QueueMonitor<S> {
    /// Create a new monitor
    pub fn new(reader: PositionReader, tracker: PositionTracker, sink: S) -> Self {
        Self {
            reader,
            tracker,
            sink,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Run a single poll: read, evaluate, notify
    ///
    /// Returns the position read, if any.
    pub async fn tick(&mut self) -> Option<QueuePosition> {
        let position = self.reader.read();

        match position {
            Some(p) => debug!(position = p, "Queue position read"),
            None => debug!("No queue position available"),
        }

        self.tracker.observe(position, &mut self.sink).await;
        position
    }

    /// Run the poll loop continuously
    ///
    /// This method never returns; stop it by dropping the future.
    #[instrument(skip(self), level = "info")]
    pub async fn run_loop(&mut self) {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            log_file = %self.reader.log_file().display(),
            "Starting queue monitor loop"
        );

        loop {
            self.tick().await;
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Run the poll loop for a limited number of ticks
    ///
    /// Returns how many ticks produced a position. Useful for testing.
    pub async fn run_iterations(&mut self, max_iterations: usize) -> usize {
        let mut observed = 0;

        for iteration in 0..max_iterations {
            if self.tick().await.is_some() {
                observed += 1;
            }
            if iteration + 1 < max_iterations {
                tokio::time::sleep(self.poll_interval).await;
            }
        }

        observed
    }

    /// Get the tracker reference
    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    /// Get the sink reference
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
