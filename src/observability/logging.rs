use std::fs;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "data_optimizer=debug,info";

/// Initializes logging with console output and a daily rolling JSON file.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_logging(dir: &Path, file_prefix: &str) {
    let _ = fs::create_dir_all(dir);

    let file_appender = tracing_appender::rolling::daily(dir, file_prefix);
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);
    let console_layer = fmt::layer().with_target(false).with_writer(std::io::stdout);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    // A second call (tests, embedded use) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    // Keep the writer alive for the process lifetime so logs flush
    std::mem::forget(_guard);
}
