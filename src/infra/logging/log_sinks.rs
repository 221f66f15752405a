// Log sink setup.
//
// - console: human readable, INFO and up
// - file: ERROR and up, size-rotated and gzipped under the log directory
// - dev mode only: a verbose console sink that shows DEBUG events with
//   their source location

use super::rotating_file::{RotatingFile, DEFAULT_MAX_BYTES};
use anyhow::Context as _;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{filter_fn, LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

/// Target prefix of this crate's own events.
const BOT_TARGET: &str = env!("CARGO_CRATE_NAME");

/// The dev sink only carries the bot's own DEBUG lines, never the gateway's.
fn shows_in_debug_sink(level: &Level, target: &str) -> bool {
    *level == Level::DEBUG
        && target
            .strip_prefix(BOT_TARGET)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

/// Keeps the file writer's worker alive. Dropping it flushes pending lines.
pub struct LogGuard {
    _file_guard: WorkerGuard,
}

pub fn init(log_directory: &Path, dev_mode: bool) -> anyhow::Result<LogGuard> {
    let file = RotatingFile::open(log_directory, "errors", DEFAULT_MAX_BYTES)
        .with_context(|| format!("Failed to open error log in {}", log_directory.display()))?;
    let (file_writer, file_guard) = tracing_appender::non_blocking(file);

    // The gateway crates are chatty at INFO.
    let console_filter = Targets::new()
        .with_default(Level::INFO)
        .with_target("serenity", Level::WARN)
        .with_target("poise", Level::WARN);

    let console = fmt::layer()
        .with_target(false)
        .with_filter(console_filter);

    let file = fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(LevelFilter::ERROR);

    let debug = dev_mode.then(|| {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(filter_fn(|metadata| {
                shows_in_debug_sink(metadata.level(), metadata.target())
            }))
    });

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(debug)
        .try_init()
        .context("Failed to install the global tracing subscriber")?;

    if dev_mode {
        tracing::debug!("Dev mode logging enabled");
    }

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_sink_only_shows_bot_debug_events() {
        assert!(shows_in_debug_sink(&Level::DEBUG, "guarddog"));
        assert!(shows_in_debug_sink(&Level::DEBUG, "guarddog::core::urls"));

        assert!(!shows_in_debug_sink(&Level::INFO, "guarddog::core::urls"));
        assert!(!shows_in_debug_sink(&Level::TRACE, "guarddog"));
        assert!(!shows_in_debug_sink(&Level::DEBUG, "serenity::gateway::shard"));
        assert!(!shows_in_debug_sink(&Level::DEBUG, "sqlx::query"));
        assert!(!shows_in_debug_sink(&Level::DEBUG, "guarddogs_fork"));
    }
}
