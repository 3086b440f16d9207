//! Tracing initialization.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! Behavior:
//! - Log level is driven by LogLevel; `quiet` (the default) installs no diagnostic output at all,
//!   so plan lines and `PROGRAM:` messages are the only output.
//! - Console diagnostics go to stderr; stdout is reserved for plan lines.
//! - If `log_file` is provided and passes safety checks, a non-blocking file layer is added.
//!
//! Implementation notes:
//! - File logging uses tracing_appender::non_blocking to avoid blocking on I/O.
//! - We refuse file logging if any ancestor of the file path is a symlink.

use anyhow::Result;
use chrono::Local;
use std::fmt as stdfmt;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{path_has_symlink_ancestor, LogLevel};
use crate::output as out;
use crate::platform::open_log_file_secure_append;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: &LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::OFF,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::TRACE,
    }
}

/// Filter limited to this crate's targets at `level`.
fn env_filter_from_level(level: LevelFilter) -> EnvFilter {
    EnvFilter::new(format!("mmv={}", level.to_string().to_ascii_lowercase()))
}

/// Try to open a non-blocking file writer for logging:
/// - Refuse if any ancestor is a symlink (prints a warning and returns None)
/// - Open file for append (0600 on create) and wrap with non_blocking
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(true) => {
            out::print_warn(&format!(
                "refusing to log to {}: an ancestor directory is a symlink",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!("cannot check log path {}: {}", path.display(), e));
            return None;
        }
        Ok(false) => {}
    }

    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!("cannot open log file {}: {}", path.display(), e));
            None
        }
    }
}

/// Initialize tracing based on LogLevel and format. Returns an optional WorkerGuard
/// if a file appender is created (must be held until exit to flush logs).
pub fn init_tracing(lvl: &LogLevel, log_file: Option<&Path>, json: bool) -> Result<Option<WorkerGuard>> {
    let level_filter = to_level_filter(lvl);
    if level_filter == LevelFilter::OFF {
        return Ok(None);
    }
    let env_filter = env_filter_from_level(level_filter);

    let file = log_file.and_then(maybe_open_non_blocking_writer);
    let (file_writer, guard) = match file {
        Some((w, g)) => (Some(w), Some(g)),
        None => (None, None),
    };

    if json {
        let console = tsfmt::layer()
            .event_format(tsfmt::format().json())
            .with_timer(LocalHumanTime)
            .with_target(true)
            .with_writer(io::stderr);
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .event_format(tsfmt::format().json())
                .with_timer(LocalHumanTime)
                .with_target(true)
                .with_writer(w)
        });
        registry().with(env_filter).with(console).with(file_layer).try_init()?;
    } else {
        let console = tsfmt::layer()
            .with_timer(LocalHumanTime)
            .with_target(true)
            .compact()
            .with_writer(io::stderr);
        let file_layer = file_writer.map(|w| {
            tsfmt::layer()
                .with_timer(LocalHumanTime)
                .with_target(true)
                .with_ansi(false)
                .compact()
                .with_writer(w)
        });
        registry().with(env_filter).with(console).with(file_layer).try_init()?;
    }
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_turns_logging_off() {
        assert_eq!(to_level_filter(&LogLevel::Quiet), LevelFilter::OFF);
        assert_eq!(to_level_filter(&LogLevel::Debug), LevelFilter::TRACE);
        assert!(init_tracing(&LogLevel::Quiet, None, false).unwrap().is_none());
    }
}
