//! Embedded subtitle track selection.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const BURN_SUBTITLE: ArgumentKey = ArgumentKey::new("burn-subtitle");
const FORCE_SUBTITLE: ArgumentKey = ArgumentKey::new("force-subtitle");
const ADD_SUBTITLE: ArgumentKey = ArgumentKey::new("add-subtitle");
const NO_AUTO_BURN: ArgumentKey = ArgumentKey::new("no-auto-burn");

/// A subtitle track reference: a track number, a language code, `scan` or `all`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtitleTrack(String);

impl SubtitleTrack {
    #[must_use]
    pub fn number(track: u32) -> Self {
        Self(track.to_string())
    }

    #[must_use]
    pub fn language(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The track found by a forced-subtitle scan.
    #[must_use]
    pub fn scan() -> Self {
        Self("scan".to_string())
    }

    #[must_use]
    pub fn all() -> Self {
        Self("all".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SubtitleTrack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("empty subtitle track".to_string()),
            track => Ok(Self(track.to_string())),
        }
    }
}

impl ArgumentValue for SubtitleTrack {
    fn argument_string(&self) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubtitleOptions {
    pub burn: Option<SubtitleTrack>,
    pub force: Option<SubtitleTrack>,
    pub tracks: Vec<SubtitleTrack>,
    pub no_auto_burn: bool,
}

impl Optionable for SubtitleOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode(BURN_SUBTITLE, self.burn.as_ref());
        options.encode(FORCE_SUBTITLE, self.force.as_ref());
        options.encode_sequence(ADD_SUBTITLE, &self.tracks);
        options.encode_flag(NO_AUTO_BURN, self.no_auto_burn, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_selection() {
        let subtitles = SubtitleOptions {
            burn: Some(SubtitleTrack::scan()),
            force: None,
            tracks: vec![SubtitleTrack::number(2), SubtitleTrack::language("fra")],
            no_auto_burn: true,
        };
        assert_eq!(
            subtitles.build_options(),
            vec![
                "--burn-subtitle=scan",
                "--add-subtitle=2",
                "--add-subtitle=fra",
                "--no-auto-burn",
            ]
        );
    }
}
