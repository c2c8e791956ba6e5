//! Shared transcripts of the tool's output streams.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Lines kept per stream; older lines are discarded first.
pub const MAX_RETAINED_LINES: usize = 1000;

#[derive(Debug, Default)]
struct Transcript {
    lines: VecDeque<String>,
    dropped: usize,
}

/// Text collected from one output stream of the tool.
///
/// Cloning yields another handle to the same buffer. Lines are appended by
/// the supervisor's reader threads while the process runs. Only the most
/// recent [`MAX_RETAINED_LINES`] lines are kept.
#[derive(Debug, Clone)]
pub struct OutputStream {
    transcript: Arc<Mutex<Transcript>>,
    enabled: bool,
    limit: usize,
}

impl Default for OutputStream {
    fn default() -> Self {
        Self::new(true)
    }
}

impl OutputStream {
    pub(crate) fn new(enabled: bool) -> Self {
        Self::with_limit(enabled, MAX_RETAINED_LINES)
    }

    pub(crate) fn with_limit(enabled: bool, limit: usize) -> Self {
        Self {
            transcript: Arc::default(),
            enabled,
            limit,
        }
    }

    pub(crate) fn push(&self, line: &str) {
        if !self.enabled {
            return;
        }
        if let Ok(mut transcript) = self.transcript.lock() {
            if transcript.lines.len() == self.limit {
                transcript.lines.pop_front();
                transcript.dropped += 1;
            }
            if self.limit > 0 {
                transcript.lines.push_back(line.to_string());
            }
        }
    }

    /// Whether this stream keeps what it receives.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.enabled
    }

    /// The retained lines, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.transcript
            .lock()
            .map(|transcript| transcript.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The retained lines, newline-joined.
    #[must_use]
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }

    /// The most recent line, if any.
    #[must_use]
    pub fn last_line(&self) -> Option<String> {
        self.transcript
            .lock()
            .ok()
            .and_then(|transcript| transcript.lines.back().cloned())
    }

    /// How many lines were discarded to stay within the limit.
    #[must_use]
    pub fn dropped_lines(&self) -> usize {
        self.transcript
            .lock()
            .map(|transcript| transcript.dropped)
            .unwrap_or_default()
    }
}
