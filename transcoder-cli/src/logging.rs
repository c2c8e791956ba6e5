// ============================================================================
// transcoder-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: console logging via env_logger, or a log file via log4rs
//
// RUST_LOG is respected for console output; `--verbose` lowers the default
// filter to debug. With `--log-dir`, logs go to a timestamped file instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use console::style;
use log::{Level, LevelFilter, debug};
use transcoder_core::CoreError;
use transcoder_core::file_logging::setup_file_logging;

use crate::error::CliResult;

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Name of the log file written for one invocation of `command`.
pub fn log_file_name(command: &str) -> String {
    format!("transcoder_{}_{}.log", command, get_timestamp())
}

fn level_label(level: Level) -> String {
    let label = match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    match level {
        Level::Error => style(label).red().bright().to_string(),
        Level::Warn => style(label).yellow().to_string(),
        Level::Info => style(label).green().to_string(),
        Level::Debug => style(label).blue().to_string(),
        Level::Trace => style(label).magenta().to_string(),
    }
}

/// Initializes console logging on stderr.
pub fn init_console(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {}",
                style(buf.timestamp_seconds()).dim(),
                level_label(record.level()),
                record.args()
            )
        })
        .init();

    debug!("Console logging initialized at {level}");
}

/// Sends logs to a new timestamped file under `log_dir` and returns its path.
pub fn init_file(log_dir: &Path, command: &str, verbose: bool) -> CliResult<PathBuf> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = log_dir.join(log_file_name(command));
    setup_file_logging(&log_file, level).map_err(|e| {
        CoreError::OperationFailed(format!(
            "Failed to set up logging in {}: {e:#}",
            log_dir.display()
        ))
    })?;
    debug!("File logging initialized at {level}");
    Ok(log_file)
}
