//! Queue position state machine
//!
//! Keeps the baseline and previous position across polls and decides which
//! notification rules fire for a new reading.

use super::log_watcher::QueuePosition;
use crate::notifier::NotificationSink;
use std::fmt;
use tracing::{debug, info};

/// Drop from the baseline that triggers a shift notification
const SHIFT_THRESHOLD: QueuePosition = 10;

/// Position at or below which the "almost in" notification fires
const REMAINING_THRESHOLD: QueuePosition = 5;

/// Which notification rules are enabled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyRules {
    /// Notify every time the position decreases
    pub on_shift_1: bool,
    /// Notify when the position dropped by 10 or more since the baseline
    pub on_shift_10: bool,
    /// Notify on every poll while 5 or fewer people are ahead
    pub on_remaining_5: bool,
}

impl NotifyRules {
    /// All rules enabled
    pub fn all() -> Self {
        Self {
            on_shift_1: true,
            on_shift_10: true,
            on_remaining_5: true,
        }
    }
}

/// Position history kept for the lifetime of the process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackingState {
    /// Baseline the next 10-position shift is measured against
    pub initial_position: Option<QueuePosition>,
    /// Position seen on the previous valid poll
    pub last_position: Option<QueuePosition>,
}

/// A fired notification rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAlert {
    /// Dropped by 10 or more since the baseline
    ShiftedByTen(QueuePosition),
    /// Moved forward since the previous poll
    Advanced(QueuePosition),
    /// 5 or fewer people left
    NearlyIn(QueuePosition),
}

impl QueueAlert {
    /// Notification text for this alert
    pub fn message(&self) -> String {
        match self {
            QueueAlert::ShiftedByTen(p) => format!(
                "Position in queue has shifted by 10 or more: Current position is {}",
                p
            ),
            QueueAlert::Advanced(p) => format!("Position in queue: {}", p),
            QueueAlert::NearlyIn(p) => format!(
                "Only 5 people left before you enter the game! Current position: {}",
                p
            ),
        }
    }

    /// Short rule name for logging
    pub fn rule(&self) -> &'static str {
        match self {
            QueueAlert::ShiftedByTen(_) => "shift_10",
            QueueAlert::Advanced(_) => "shift_1",
            QueueAlert::NearlyIn(_) => "remaining_5",
        }
    }
}

impl fmt::Display for QueueAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Decides when queue movement is worth a notification
#[derive(Debug, Clone)]
pub struct PositionTracker {
    rules: NotifyRules,
    state: TrackingState,
}

impl PositionTracker {
    /// Create a tracker with empty history
    pub fn new(rules: NotifyRules) -> Self {
        Self {
            rules,
            state: TrackingState::default(),
        }
    }

    /// Create a tracker resuming from existing history
    pub fn with_state(rules: NotifyRules, state: TrackingState) -> Self {
        Self { rules, state }
    }

    /// Update the history with a reading and return the rules that fired, in order
    ///
    /// `None` leaves the state untouched and fires nothing.
    pub fn evaluate(&mut self, position: Option<QueuePosition>) -> Vec<QueueAlert> {
        let Some(position) = position else {
            return Vec::new();
        };

        let mut alerts = Vec::new();

        let baseline = *self.state.initial_position.get_or_insert(position);

        if self.rules.on_shift_10 && baseline.saturating_sub(position) >= SHIFT_THRESHOLD {
            alerts.push(QueueAlert::ShiftedByTen(position));
            self.state.initial_position = Some(position);
        }

        if self.rules.on_shift_1 {
            if let Some(last) = self.state.last_position {
                if position < last {
                    alerts.push(QueueAlert::Advanced(position));
                }
            }
        }

        // Level-triggered: repeats on every poll while the position stays low
        if self.rules.on_remaining_5 && position <= REMAINING_THRESHOLD {
            alerts.push(QueueAlert::NearlyIn(position));
        }

        self.state.last_position = Some(position);

        debug!(
            position,
            initial_position = ?self.state.initial_position,
            fired = alerts.len(),
            "Queue position evaluated"
        );

        alerts
    }

    /// Evaluate a reading and deliver every fired alert through `sink`
    pub async fn observe<S>(
        &mut self,
        position: Option<QueuePosition>,
        sink: &mut S,
    ) -> Vec<QueueAlert>
    where
        S: NotificationSink + ?Sized,
    {
        let alerts = self.evaluate(position);

        for alert in &alerts {
            info!(rule = alert.rule(), message = %alert, "Queue alert fired");
            sink.notify(&alert.message()).await;
        }

        alerts
    }

    /// Current position history
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Enabled rules
    pub fn rules(&self) -> NotifyRules {
        self.rules
    }
}
