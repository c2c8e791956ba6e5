// ============================================================================
// transcoder-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOL: Locating and verifying `transcode-video`
//
// KEY COMPONENTS:
// - resolve_tool: finds the executable on PATH (or checks an explicit path)
// - query_version: runs `--version` and parses the first line
// - verify_tool: the full availability + compatibility check
// - VerifiedTool: proof that the check passed; required to build a Transcoder
//
// Verified versions are cached per resolved program path for the lifetime of
// the process, so repeated jobs do not re-run `--version`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Mutex;

use log::{debug, info, warn};
use once_cell::sync::Lazy;

use crate::config::TranscoderConfig;
use crate::error::{CoreError, CoreResult};

pub mod version;

pub use version::{REQUIRED_VERSION, ToolVersion, VersionAdvice, compatibility_advice};

/// Name of the tool looked up on `PATH` when no explicit path is configured.
pub const TRANSCODE_VIDEO_COMMAND: &str = "transcode-video";

static VERSION_CACHE: Lazy<Mutex<HashMap<PathBuf, ToolVersion>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// A `transcode-video` executable that passed [`verify_tool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTool {
    program: PathBuf,
    version: ToolVersion,
}

impl VerifiedTool {
    /// The resolved executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    #[must_use]
    pub fn version(&self) -> ToolVersion {
        self.version
    }
}

/// Resolves `tool` to an executable path. Bare names are searched on `PATH`.
pub fn resolve_tool(tool: &Path) -> CoreResult<PathBuf> {
    which::which(tool).map_err(|e| {
        warn!("Dependency '{}' not found: {}", tool.display(), e);
        CoreError::ToolNotFound {
            tool: tool.display().to_string(),
        }
    })
}

/// Runs `program --version` and parses the reported version.
pub fn query_version(program: &Path) -> CoreResult<ToolVersion> {
    let tool = program.display().to_string();
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CoreError::VersionQuery {
            tool: tool.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CoreError::VersionQuery {
            tool,
            reason: format!("`--version` exited with {}", output.status),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stdout.trim().is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        stdout.into_owned()
    };

    ToolVersion::from_version_output(&text).ok_or_else(|| CoreError::UnparseableVersion {
        tool,
        output: text.lines().next().unwrap_or_default().to_string(),
    })
}

fn cached_version(program: &Path) -> CoreResult<ToolVersion> {
    if let Some(version) = VERSION_CACHE
        .lock()
        .ok()
        .and_then(|cache| cache.get(program).copied())
    {
        debug!("Using cached version {} for {}", version, program.display());
        return Ok(version);
    }

    let version = query_version(program)?;
    if let Ok(mut cache) = VERSION_CACHE.lock() {
        cache.insert(program.to_path_buf(), version);
    }
    Ok(version)
}

/// Checks that the configured tool exists and reports a compatible version.
///
/// The tool must report the configured `major.minor` (patch is ignored).
/// Anything else is fatal and carries advice on how to fix it.
pub fn verify_tool(config: &TranscoderConfig) -> CoreResult<VerifiedTool> {
    let program = resolve_tool(&config.tool)?;
    let version = cached_version(&program)?;

    if let Some(advice) = compatibility_advice(version, config.required_version) {
        return Err(CoreError::IncompatibleVersion {
            tool: program.display().to_string(),
            found: version,
            required: config.required_version,
            advice,
        });
    }

    info!("Using {} {}", program.display(), version);
    Ok(VerifiedTool { program, version })
}

#[cfg(test)]
pub(crate) fn verified_for_tests(program: impl Into<PathBuf>) -> VerifiedTool {
    VerifiedTool {
        program: program.into(),
        version: ToolVersion::new(REQUIRED_VERSION.0, REQUIRED_VERSION.1, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_reported_with_install_advice() {
        let config = TranscoderConfig::builder()
            .tool("definitely-not-a-real-transcode-video-binary")
            .build();
        let err = verify_tool(&config).unwrap_err();
        assert!(matches!(err, CoreError::ToolNotFound { .. }));
        assert!(err.to_string().contains("gem install video_transcoding"));
    }
}
