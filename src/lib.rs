pub mod config;
pub mod monitoring;
pub mod notifier;
pub mod shutdown;
pub mod utils;

use config::AppConfig;
use monitoring::{PositionReader, PositionTracker, QueueMonitor};
use notifier::StatusNotifier;

/// 시작 시 전송되는 메시지
pub const READY_MESSAGE: &str = "I'm loaded";

/// 설정으로부터 모니터 구성
pub fn build_monitor(config: &AppConfig) -> QueueMonitor<StatusNotifier> {
    QueueMonitor::new(
        PositionReader::new(&config.log_file_path),
        PositionTracker::new(config.rules),
        StatusNotifier::from_config(config),
    )
    .with_poll_interval(config.settings.poll_interval)
}
