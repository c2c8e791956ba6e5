// ============================================================================
// transcoder-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types for the transcoder core library
//
// Setup failures (tool missing, version unusable) and spawn failures are the
// only hard errors this crate produces. Malformed progress output is never an
// error, and process-level failures are reported through `ExitReport`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::external::version::{ToolVersion, VersionAdvice};

/// Errors produced by the transcoder core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Could not locate `{tool}` in your PATH. Install it with `gem install video_transcoding`")]
    ToolNotFound { tool: String },

    #[error("Failed to retrieve the `{tool}` version: {reason}")]
    VersionQuery { tool: String, reason: String },

    #[error("Could not parse a `major.minor.patch` version for `{tool}` from: {output:?}")]
    UnparseableVersion { tool: String, output: String },

    #[error(
        "Unsupported `{tool}` version: {found} (requires {}.{}.x). {advice}",
        .required.0,
        .required.1
    )]
    IncompatibleVersion {
        tool: String,
        found: ToolVersion,
        required: (u32, u32),
        advice: VersionAdvice,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("The {0} stream of the spawned process was not captured")]
    StreamUnavailable(&'static str),

    #[error("The transcode has not been started")]
    NotStarted,

    #[error("Invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid options file {}: {source}", .path.display())]
    OptionsFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for transcoder core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds the error returned when a command cannot be spawned.
pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::Spawn {
        command: command.into(),
        source,
    }
}

/// Builds the error returned when waiting on a spawned command fails.
pub fn command_wait_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::Wait {
        command: command.into(),
        source,
    }
}
