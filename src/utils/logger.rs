//! Logging Infrastructure
//!
//! Structured logging setup with support for both development and production environments.

use std::path::Path;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional file output
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // Add file output if log_dir is provided
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "market-server");
            subscriber.with_writer(file_appender).init();
            return;
        }
    }

    subscriber.init();
}

/// 设置运行环境: dotenv + 日志
///
/// 生产环境把日志写到 `WORK_DIR/logs`，开发环境输出到终端
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("RUST_LOG").ok();
    let environment =
        std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

    if environment == "production" {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/market".into());
        let log_dir = Path::new(&work_dir).join("logs");
        std::fs::create_dir_all(&log_dir)?;
        init_logger_with_file(level.as_deref(), log_dir.to_str());
    } else {
        init_logger_with_file(level.as_deref(), None);
    }

    Ok(())
}
