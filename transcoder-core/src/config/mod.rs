//! Configuration structures and constants for the transcoder-core library.
//!
//! [`TranscoderConfig`] controls how the external tool is located and how its
//! output is consumed. What the tool is asked to do lives in
//! [`TranscoderOptions`](crate::options::TranscoderOptions).

mod builder;
pub mod utils;

use std::path::PathBuf;
use std::time::Duration;

pub use builder::TranscoderConfigBuilder;

use crate::error::{CoreError, CoreResult};
use crate::external::{REQUIRED_VERSION, TRANSCODE_VIDEO_COMMAND};
use crate::process::LineSourceKind;
use utils::{EnvLookup, get_env_bool, get_env_parsed, get_env_path};

// Default constants

/// How long a poll-based drain waits for data before re-checking cancellation,
/// and how often the supervisor checks whether the process has exited.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Read size used when pulling chunks from the tool's stdout.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Environment variable overriding the tool path or name.
pub const ENV_TOOL: &str = "TRANSCODER_TOOL";
/// Environment variable selecting `push` or `poll` line delivery.
pub const ENV_LINE_SOURCE: &str = "TRANSCODER_LINE_SOURCE";
pub const ENV_POLL_INTERVAL_MS: &str = "TRANSCODER_POLL_INTERVAL_MS";
pub const ENV_CHUNK_SIZE: &str = "TRANSCODER_CHUNK_SIZE";
pub const ENV_CAPTURE_STDERR: &str = "TRANSCODER_CAPTURE_STDERR";
pub const ENV_OWN_PROCESS_GROUP: &str = "TRANSCODER_OWN_PROCESS_GROUP";

/// Settings for locating and supervising `transcode-video`.
///
/// # Examples
///
/// ```rust
/// use transcoder_core::config::TranscoderConfig;
/// use transcoder_core::process::LineSourceKind;
/// use std::time::Duration;
///
/// let config = TranscoderConfig::builder()
///     .tool("/usr/local/bin/transcode-video")
///     .line_source(LineSourceKind::Poll)
///     .poll_interval(Duration::from_millis(50))
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscoderConfig {
    /// Tool name searched on `PATH`, or an explicit path to the executable
    pub tool: PathBuf,

    /// `major.minor` the tool must report; patch is ignored
    pub required_version: (u32, u32),

    /// How stdout lines are delivered to the progress extractor
    pub line_source: LineSourceKind,

    /// Poll/cancellation granularity
    pub poll_interval: Duration,

    /// Read size for stdout chunks
    pub chunk_size: usize,

    /// Whether stderr is kept in memory (it is always drained)
    pub capture_stderr: bool,

    /// Whether the default spawner starts the tool in a new process group.
    /// Control signals then reach the tool's helpers too, but terminal
    /// Ctrl-C no longer does.
    pub own_process_group: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(TRANSCODE_VIDEO_COMMAND),
            required_version: REQUIRED_VERSION,
            line_source: LineSourceKind::platform_default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            capture_stderr: true,
            own_process_group: true,
        }
    }
}

impl TranscoderConfig {
    #[must_use]
    pub fn builder() -> TranscoderConfigBuilder {
        TranscoderConfigBuilder::new()
    }

    /// Default configuration with `TRANSCODER_*` environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(&utils::system_env)
    }

    /// Applies overrides from `env`. Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, env: EnvLookup<'_>) -> Self {
        self.tool = get_env_path(env, ENV_TOOL, self.tool);
        self.line_source = get_env_parsed(env, ENV_LINE_SOURCE, self.line_source);
        let default_poll_ms = self.poll_interval.as_millis() as u64;
        let poll_ms = get_env_parsed(env, ENV_POLL_INTERVAL_MS, default_poll_ms);
        self.poll_interval = Duration::from_millis(poll_ms);
        self.chunk_size = get_env_parsed(env, ENV_CHUNK_SIZE, self.chunk_size);
        self.capture_stderr = get_env_bool(env, ENV_CAPTURE_STDERR, self.capture_stderr);
        self.own_process_group =
            get_env_bool(env, ENV_OWN_PROCESS_GROUP, self.own_process_group);
        self
    }

    /// Rejects values the supervisor cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.tool.as_os_str().is_empty() {
            return Err(CoreError::Config("tool path must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config("poll interval must be positive".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TranscoderConfig::default();
        assert_eq!(config.tool, PathBuf::from("transcode-video"));
        assert_eq!(config.required_version, (0, 25));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env = |key: &str| -> Option<String> {
            match key {
                ENV_TOOL => Some("/opt/bin/transcode-video".to_string()),
                ENV_LINE_SOURCE => Some("push".to_string()),
                ENV_POLL_INTERVAL_MS => Some("25".to_string()),
                ENV_CHUNK_SIZE => Some("not-a-number".to_string()),
                ENV_CAPTURE_STDERR => Some("0".to_string()),
                ENV_OWN_PROCESS_GROUP => Some("false".to_string()),
                _ => None,
            }
        };
        let config = TranscoderConfig::default().with_env_overrides(&env);
        assert_eq!(config.tool, PathBuf::from("/opt/bin/transcode-video"));
        assert_eq!(config.line_source, LineSourceKind::Push);
        assert_eq!(config.poll_interval, Duration::from_millis(25));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(!config.capture_stderr);
        assert!(!config.own_process_group);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = TranscoderConfig::builder()
            .poll_interval(Duration::ZERO)
            .build();
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));
    }
}
