// Logging setup - tracing subscriber for the shell binary
//
// The shell prints list snapshots on stdout, so log output goes to stderr to
// keep the two streams apart. File logging is optional and writes through a
// non-blocking rolling appender, as JSON lines or plain text.
//
// Precedence: RUST_LOG env var > config level > "info"

use crate::config::{LogFileFormat, LogRotation, LoggingConfig};
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the default filter directive from the configured level
pub fn default_directive(config: &LoggingConfig) -> String {
    format!("searchlist={},reqwest=warn", config.level)
}

fn file_appender(config: &LoggingConfig) -> RollingFileAppender {
    let (dir, prefix) = (&config.file_dir, &config.file_prefix);
    match config.file_rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(dir, prefix),
        LogRotation::Daily => tracing_appender::rolling::daily(dir, prefix),
    }
}

/// Install the global subscriber
///
/// The returned guard must be kept alive for the duration of the program so
/// buffered file logs are flushed on exit.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    if !config.file_enabled {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .context("Failed to install tracing subscriber")?;
        return Ok(None);
    }

    std::fs::create_dir_all(&config.file_dir)
        .with_context(|| format!("Could not create log directory {:?}", config.file_dir))?;

    // Writes happen on a background thread
    let (writer, guard) = tracing_appender::non_blocking(file_appender(config));

    // At most one of these is Some; a None layer is a no-op
    let (json_layer, text_layer) = match config.file_format {
        LogFileFormat::Json => (
            Some(fmt::layer().json().with_writer(writer).with_ansi(false)),
            None,
        ),
        LogFileFormat::Text => (
            None,
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(Some(guard))
}
