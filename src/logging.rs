//! Logging system initialization
//!
//! Sets up the tracing subscriber from [`LoggingConfig`]: stdout or file
//! output, optional daily rotation, text or JSON formatting.

use tracing_appender::rolling;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber.
///
/// Call once during startup, after configuration is loaded. The returned
/// guard must be kept alive for the duration of the program so buffered
/// log lines are flushed on shutdown.
pub fn init_logging(config: &LoggingConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> = match config.file.as_deref() {
        Some(log_file) if !log_file.is_empty() && config.enable_rotation => {
            let dir = std::path::Path::new(log_file)
                .parent()
                .unwrap_or(std::path::Path::new("."));
            let filename = std::path::Path::new(log_file)
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("curtail.log");
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .max_log_files(config.max_backups as usize)
                .build(dir)
                .expect("Failed to create rolling log appender");
            Box::new(appender)
        }
        Some(log_file) if !log_file.is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .expect("Failed to open log file");
            Box::new(file)
        }
        _ => Box::new(std::io::stdout()),
    };

    let log_to_stdout = config.file.as_deref().is_none_or(|f| f.is_empty());

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::new(config.level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(log_to_stdout);

    if config.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    guard
}
