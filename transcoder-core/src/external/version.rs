//! `transcode-video --version` parsing and compatibility rules.

use std::fmt;
use std::str::FromStr;

/// The `major.minor` release line this crate drives.
pub const REQUIRED_VERSION: (u32, u32) = (0, 25);

/// A `major.minor.patch` tool version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this version belongs to the given `major.minor` line. Patch is ignored.
    #[must_use]
    pub fn matches(&self, required: (u32, u32)) -> bool {
        (self.major, self.minor) == required
    }

    /// Extracts the version from `--version` output.
    ///
    /// Only the first line is looked at, and only its last whitespace-separated
    /// token, e.g. `transcode-video 0.25.3` yields `0.25.3`.
    #[must_use]
    pub fn from_version_output(output: &str) -> Option<Self> {
        output
            .lines()
            .next()?
            .split_whitespace()
            .next_back()?
            .parse()
            .ok()
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Error returned when a string is not `major.minor.patch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version string: {:?}", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for ToolVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError(s.to_string());
        let mut parts = s.split('.');
        let mut next = || -> Result<u32, ParseVersionError> {
            parts.next().ok_or_else(err)?.parse().map_err(|_| err())
        };
        let version = ToolVersion::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(version)
    }
}

/// What the user should do about an unusable tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionAdvice {
    /// Installed release is older than required.
    Upgrade,
    /// Installed release is newer than this crate knows about.
    Downgrade,
    /// The tool is not installed at all.
    Install,
}

impl fmt::Display for VersionAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionAdvice::Upgrade => {
                f.write_str("Try upgrading with `gem update video_transcoding`.")
            }
            VersionAdvice::Downgrade => f.write_str(
                "Downgrade to a supported release or file a compatibility request.",
            ),
            VersionAdvice::Install => {
                f.write_str("Install it with `gem install video_transcoding`.")
            }
        }
    }
}

/// Returns `None` when `found` is usable, otherwise the advice to show.
#[must_use]
pub fn compatibility_advice(found: ToolVersion, required: (u32, u32)) -> Option<VersionAdvice> {
    match (found.major, found.minor).cmp(&required) {
        std::cmp::Ordering::Equal => None,
        std::cmp::Ordering::Less => Some(VersionAdvice::Upgrade),
        std::cmp::Ordering::Greater => Some(VersionAdvice::Downgrade),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_last_token_of_first_line() {
        let output = "transcode-video 0.25.3\nCopyright (c) 2013-2020 Don Melton\n";
        assert_eq!(
            ToolVersion::from_version_output(output),
            Some(ToolVersion::new(0, 25, 3))
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(ToolVersion::from_version_output(""), None);
        assert_eq!(ToolVersion::from_version_output("transcode-video\n0.25.3"), None);
        assert_eq!(ToolVersion::from_version_output("transcode-video 0.25"), None);
        assert_eq!(ToolVersion::from_version_output("transcode-video 0.25.3.1"), None);
        assert_eq!(ToolVersion::from_version_output("transcode-video v0.25.3"), None);
    }

    #[test]
    fn test_patch_is_ignored_for_compatibility() {
        assert_eq!(compatibility_advice(ToolVersion::new(0, 25, 0), (0, 25)), None);
        assert_eq!(compatibility_advice(ToolVersion::new(0, 25, 99), (0, 25)), None);
    }

    #[test]
    fn test_advice_depends_on_direction() {
        assert_eq!(
            compatibility_advice(ToolVersion::new(0, 24, 9), (0, 25)),
            Some(VersionAdvice::Upgrade)
        );
        assert_eq!(
            compatibility_advice(ToolVersion::new(1, 0, 0), (0, 25)),
            Some(VersionAdvice::Downgrade)
        );
        assert!(VersionAdvice::Upgrade.to_string().contains("gem update video_transcoding"));
        assert!(VersionAdvice::Install.to_string().contains("gem install video_transcoding"));
    }
}
