//! File logging for long-running transcodes.
//!
//! The CLI logs to the console by default; when a log directory is given it
//! routes everything through log4rs into a single file instead.

mod setup;

pub use setup::{FILE_LOG_PATTERN, setup_file_logging};
