// ============================================================================
// transcoder-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Fluent construction of TranscoderConfig
//
// Every field starts at its default from `config/mod.rs`; setters only touch
// what the caller cares about.

use std::path::PathBuf;
use std::time::Duration;

use super::TranscoderConfig;
use crate::process::LineSourceKind;

/// Builder for creating TranscoderConfig instances.
#[derive(Debug, Clone, Default)]
pub struct TranscoderConfigBuilder {
    config: TranscoderConfig,
}

impl TranscoderConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tool name or path.
    pub fn tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.config.tool = tool.into();
        self
    }

    /// Sets the `major.minor` version the tool must report.
    pub fn required_version(mut self, major: u32, minor: u32) -> Self {
        self.config.required_version = (major, minor);
        self
    }

    pub fn line_source(mut self, kind: LineSourceKind) -> Self {
        self.config.line_source = kind;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Sets whether stderr output is kept for later inspection.
    pub fn capture_stderr(mut self, capture: bool) -> Self {
        self.config.capture_stderr = capture;
        self
    }

    pub fn own_process_group(mut self, enabled: bool) -> Self {
        self.config.own_process_group = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> TranscoderConfig {
        self.config
    }
}
