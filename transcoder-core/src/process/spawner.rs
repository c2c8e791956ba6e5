//! Process spawning abstraction.
//!
//! The supervisor never calls `Command::spawn` directly; it goes through a
//! [`ProcessSpawner`] so tests can observe or replace process creation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use crate::arguments::quote_value;
use crate::error::{CoreResult, command_start_error};

/// Program plus argument vector of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLine {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_value(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Creates child processes with piped stdout and stderr.
pub trait ProcessSpawner: Send + Sync {
    fn spawn(&self, command: &CommandLine) -> CoreResult<Child>;
}

/// Spawns through `std::process::Command`.
///
/// On unix the tool is made the leader of a new process group by default, so
/// control signals reach the helpers it starts as well.
#[derive(Debug, Clone, Copy)]
pub struct StdSpawner {
    own_process_group: bool,
}

impl StdSpawner {
    #[must_use]
    pub fn new() -> Self {
        Self {
            own_process_group: true,
        }
    }

    /// With `false` the tool stays in the caller's process group, where
    /// terminal job control (Ctrl-C, Ctrl-Z) reaches it directly.
    #[must_use]
    pub fn own_process_group(mut self, enabled: bool) -> Self {
        self.own_process_group = enabled;
        self
    }
}

impl Default for StdSpawner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSpawner for StdSpawner {
    fn spawn(&self, command: &CommandLine) -> CoreResult<Child> {
        log::debug!("Spawning: {command}");
        let mut process = Command::new(command.program());
        process
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        if self.own_process_group {
            use std::os::unix::process::CommandExt;
            process.process_group(0);
        }
        process
            .spawn()
            .map_err(|e| command_start_error(command.to_string(), e))
    }
}
