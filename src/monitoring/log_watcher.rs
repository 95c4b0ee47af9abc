//! Log file reader for queue position tracking
//!
//! This module extracts the latest queue position from a game client log:
//! - Re-reads the whole log file on every poll
//! - Scans lines bottom-up for `Position in queue: N`
//! - Treats a missing or unreadable file as "no position yet"

use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Pattern for a queue position line
const POSITION_PATTERN: &str = r"Position in queue:\s*(\d+)";

/// Queue position as reported by the game client
pub type QueuePosition = u64;

/// Reads the most recent queue position from a log file
#[derive(Debug, Clone)]
pub struct PositionReader {
    /// Log file to read
    log_file: PathBuf,
    /// Compiled position pattern
    pattern: Regex,
}

impl PositionReader {
    /// Create a new reader for the given log file
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
            pattern: position_pattern(),
        }
    }

    /// Read the latest queue position from the log file
    ///
    /// Returns `None` when the file does not exist yet, cannot be read,
    /// or contains no position line. Never fails.
    pub fn read(&self) -> Option<QueuePosition> {
        let bytes = match fs::read(&self.log_file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(log_file = %self.log_file.display(), "Log file does not exist yet");
                return None;
            }
            Err(e) => {
                warn!(error = %e, log_file = %self.log_file.display(), "Failed to read log file");
                return None;
            }
        };

        let content = String::from_utf8_lossy(&bytes);
        let position = self.latest_position(&content);

        if position.is_none() {
            debug!(log_file = %self.log_file.display(), "No queue position found in log");
        }

        position
    }

    /// Find the position on the bottom-most matching line of `content`
    pub fn latest_position(&self, content: &str) -> Option<QueuePosition> {
        content
            .lines()
            .rev()
            .find_map(|line| self.parse_queue_position(line))
    }

    /// Parse a queue position out of a single log line
    pub fn parse_queue_position(&self, line: &str) -> Option<QueuePosition> {
        let digits = self.pattern.captures(line)?.get(1)?.as_str();

        match digits.parse() {
            Ok(position) => Some(position),
            Err(e) => {
                warn!(error = %e, digits = %digits, "Queue position out of range, skipping line");
                None
            }
        }
    }

    /// Get the log file path
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

fn position_pattern() -> Regex {
    Regex::new(POSITION_PATTERN).expect("queue position pattern is valid")
}
