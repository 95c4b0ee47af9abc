use queue_notifier::config::{config_path_from_env, AppConfig};
use queue_notifier::notifier::NotificationSink;
use queue_notifier::shutdown::shutdown_signal;
use queue_notifier::utils::init_logging;
use queue_notifier::{build_monitor, READY_MESSAGE};

const BANNER: &str = r#"
  ___                          _   _       _   _  __ _
 / _ \ _   _  ___ _   _  ___  | \ | | ___ | |_(_)/ _(_) ___ _ __
| | | | | | |/ _ \ | | |/ _ \ |  \| |/ _ \| __| | |_| |/ _ \ '__|
| |_| | |_| |  __/ |_| |  __/ | |\  | (_) | |_| |  _| |  __/ |
 \__\_\\__,_|\___|\__,_|\___| |_| \_|\___/ \__|_|_| |_|\___|_|
"#;

#[tokio::main]
async fn main() {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    println!("{}", BANNER);
    println!("{:>60}", format!("v{}", env!("CARGO_PKG_VERSION")));

    // 2. 설정 로드 (없으면 대화형 설정, stdin을 막으므로 blocking 스레드에서 실행)
    let config_path = config_path_from_env();
    let loaded = tokio::task::spawn_blocking({
        let path = config_path.clone();
        move || AppConfig::load_or_setup(&path)
    })
    .await;

    // 3. 로깅 초기화 (설정 프롬프트 이후, guard는 main 종료까지 유지)
    let log_guard = init_logging();

    let config = match loaded {
        Ok(Ok(config)) => config,
        Ok(Err(e)) => {
            tracing::error!(error = %e, path = %config_path.display(), "Invalid configuration");
            eprintln!("{}", e);
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Configuration task failed");
            drop(log_guard);
            std::process::exit(1);
        }
    };

    tracing::info!(
        bot_type = ?config.bot.bot_type(),
        log_file = %config.log_file_path.display(),
        notify_on_shift_1 = config.rules.on_shift_1,
        notify_on_shift_10 = config.rules.on_shift_10,
        notify_on_remaining_5 = config.rules.on_remaining_5,
        "Configuration loaded"
    );

    // 4. 모니터 구성 및 시작 알림
    let mut monitor = build_monitor(&config);
    monitor.sink().log_in().await;
    monitor.sink().announce_ready(READY_MESSAGE).await;

    // 5. 폴링 루프 실행 (종료 시그널까지)
    tokio::select! {
        _ = monitor.run_loop() => {},
        _ = shutdown_signal() => {
            tracing::info!("Queue notifier stopped");
        },
    }
}
