use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// Each run gets its own timestamped log file under `logs/` so a failed
/// portal session can be inspected after the fact without digging through
/// interleaved runs.
pub fn init_logging() {
    // Ensure logs directory exists
    let _ = fs::create_dir_all("logs");

    let run_stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let file_appender =
        tracing_appender::rolling::never("logs", format!("run_{run_stamp}.log"));
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(file_appender);

    // Plain-text layer for the per-run file
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking_writer);

    // Formatted layer echoing to the console
    let console_layer = fmt::layer().with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("appcoll_scraper=info".parse().unwrap()))
        .with(file_layer)
        .with(console_layer)
        .init();

    // We need to keep the guard in scope to ensure logs are flushed on exit
    std::mem::forget(_guard);
}
