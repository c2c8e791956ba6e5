//! Core library for driving the `transcode-video` command-line tool.
//!
//! This crate turns a typed job description into the tool's argument vector,
//! checks that a compatible release of the tool is installed, then spawns and
//! supervises it while extracting live progress and ETA from its output.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use transcoder_core::{TranscoderConfig, TranscoderOptions, Transcoder, verify_tool};
//! use transcoder_core::options::EncoderPreset;
//! use std::time::Duration;
//!
//! let config = TranscoderConfig::from_env();
//! let tool = verify_tool(&config).unwrap();
//!
//! let mut options = TranscoderOptions::default();
//! options.quality.preset = Some(EncoderPreset::Slow);
//! options.output.dry_run = true;
//!
//! let transcoder = Transcoder::builder(tool, "/movies/Movie.mkv")
//!     .options(options)
//!     .config(config)
//!     .build()
//!     .unwrap();
//! transcoder.start().unwrap();
//! while transcoder.wait_timeout(Duration::from_millis(500)).is_none() {
//!     println!("{:.1}% ETA {:?}", transcoder.percent(), transcoder.eta());
//! }
//! println!("{}", transcoder.finish().unwrap());
//! ```

pub mod arguments;
pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod options;
pub mod process;
pub mod utils;

// Re-exports for public API
pub use config::{TranscoderConfig, TranscoderConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{REQUIRED_VERSION, ToolVersion, VerifiedTool, verify_tool};
pub use options::TranscoderOptions;
pub use process::{
    Eta, ExitReport, FinishedProcess, LineSourceKind, ProgressSnapshot, TerminationReason,
    TranscodeState, Transcoder,
};
pub use utils::{format_duration, format_eta};
