use std::io;
use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const FILE_FILTER: &str = "info,clustering=debug,harness=debug";

fn stdout_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: stdout filtered by `RUST_LOG` (default
/// `info`), plus a daily-rolling `biblink.log` under `log_dir` when given.
///
/// Calling it twice keeps the first subscriber.
pub fn configure_logging(log_dir: Option<&Path>) {
    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(stdout_filter());

    let file_log = log_dir.map(|dir| {
        let file_appender = rolling::daily(dir, "biblink.log");
        fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender)
            .with_filter(EnvFilter::new(FILE_FILTER))
    });

    let _ = tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .try_init();
}
