use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::{
    append::file::FileAppender,
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};
use std::path::Path;

/// Line format of the log file: timestamp, level, target, message.
pub const FILE_LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t}: {m}{n}";

/// Installs a log4rs file logger at `log_file`.
///
/// Per-line progress tracing is capped at debug so a `trace` level does not
/// flood the file with every redraw of the status line.
pub fn setup_file_logging(log_file: &Path, log_level: LevelFilter) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_LOG_PATTERN)))
        .build(log_file)
        .with_context(|| format!("opening log file {}", log_file.display()))?;

    let progress_level = log_level.min(LevelFilter::Debug);
    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .logger(Logger::builder().build("transcoder::progress", progress_level))
        .build(Root::builder().appender("file").build(log_level))?;

    log4rs::init_config(config)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let log_file = dir.path().join("nested").join("transcoder.log");
        setup_file_logging(&log_file, LevelFilter::Info).unwrap();
        log::info!("file logging works");
        assert!(log_file.exists());
    }
}
