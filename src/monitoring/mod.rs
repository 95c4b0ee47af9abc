//! Queue position monitoring
//!
//! This module turns game client log output into queue notifications:
//! - Log file reading and position parsing
//! - Position tracking and rule evaluation
//! - Poll loop

pub mod log_watcher;
pub mod processor;
pub mod tracker;

pub use log_watcher::{PositionReader, QueuePosition};
pub use processor::QueueMonitor;
pub use tracker::{NotifyRules, PositionTracker, QueueAlert, TrackingState};
