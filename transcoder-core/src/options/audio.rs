//! Audio track selection, layout and codec options.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const MAIN_AUDIO: ArgumentKey = ArgumentKey::new("main-audio");
const ADD_AUDIO: ArgumentKey = ArgumentKey::new("add-audio");
const AUDIO_WIDTH: ArgumentKey = ArgumentKey::new("audio-width");
const REVERSE_DOUBLE_ORDER: ArgumentKey = ArgumentKey::new("reverse-double-order");
const AUDIO_FORMAT: ArgumentKey = ArgumentKey::new("audio-format");
const KEEP_AC3_STEREO: ArgumentKey = ArgumentKey::new("keep-ac3-stereo");
const AC3_ENCODER: ArgumentKey = ArgumentKey::new("ac3-encoder");
const AC3_BITRATE: ArgumentKey = ArgumentKey::new("ac3-bitrate");
const PASS_AC3_BITRATE: ArgumentKey = ArgumentKey::new("pass-ac3-bitrate");
const COPY_AUDIO: ArgumentKey = ArgumentKey::new("copy-audio");
const COPY_AUDIO_NAME: ArgumentKey = ArgumentKey::new("copy-audio-name");
const AAC_ENCODER: ArgumentKey = ArgumentKey::new("aac-encoder");
const MIXDOWN: ArgumentKey = ArgumentKey::new("mixdown");
const NO_AUDIO: ArgumentKey = ArgumentKey::new("no-audio");

/// An audio track reference: a number, a language code, `all`, `main` or `other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioTrack(String);

impl AudioTrack {
    #[must_use]
    pub fn number(track: u32) -> Self {
        Self(track.to_string())
    }

    #[must_use]
    pub fn language(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn all() -> Self {
        Self("all".to_string())
    }

    #[must_use]
    pub fn main() -> Self {
        Self("main".to_string())
    }

    #[must_use]
    pub fn other() -> Self {
        Self("other".to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ArgumentValue for AudioTrack {
    fn argument_string(&self) -> String {
        self.0.clone()
    }
}

/// A track with an optional display name, `track=name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackName {
    pub track: AudioTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TrackName {
    #[must_use]
    pub fn new(track: AudioTrack) -> Self {
        Self { track, name: None }
    }

    #[must_use]
    pub fn named(track: AudioTrack, name: impl Into<String>) -> Self {
        Self {
            track,
            name: Some(name.into()),
        }
    }
}

impl fmt::Display for TrackName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}={}", self.track.as_str(), name),
            None => f.write_str(self.track.as_str()),
        }
    }
}

impl FromStr for TrackName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (track, name) = match s.split_once('=') {
            Some((track, name)) => (track.trim(), Some(name)),
            None => (s.trim(), None),
        };
        if track.is_empty() {
            return Err(format!("missing audio track in '{s}'"));
        }
        let track = AudioTrack::language(track);
        Ok(match name {
            Some(name) => Self::named(track, name),
            None => Self::new(track),
        })
    }
}

impl ArgumentValue for TrackName {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackWidth {
    Double,
    Surround,
    Stereo,
}

keyword_value!(TrackWidth {
    Double => "double",
    Surround => "surround",
    Stereo => "stereo",
});

/// Which output layout an audio format applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTarget {
    Surround,
    Stereo,
}

keyword_value!(FormatTarget {
    Surround => "surround",
    Stereo => "stereo",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Ac3,
    Aac,
    Copy,
}

keyword_value!(AudioCodec {
    Ac3 => "ac3",
    Aac => "aac",
    Copy => "copy",
});

/// `surround=ac3`, `stereo=aac` and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub target: FormatTarget,
    pub codec: AudioCodec,
}

impl ArgumentValue for AudioFormat {
    fn argument_string(&self) -> String {
        format!("{}={}", self.target.as_str(), self.codec.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ac3Encoder {
    #[default]
    Ac3,
    Eac3,
}

keyword_value!(Ac3Encoder {
    Ac3 => "ac3",
    Eac3 => "eac3",
});

/// AC-3 bitrate in Kbps. Only the rates the tool accepts can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Ac3Bitrate(u32);

impl Ac3Bitrate {
    pub const SUPPORTED: [u32; 5] = [384, 448, 640, 768, 1536];
    pub const DEFAULT: Ac3Bitrate = Ac3Bitrate(640);

    #[must_use]
    pub fn kbps(&self) -> u32 {
        self.0
    }
}

impl Default for Ac3Bitrate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for Ac3Bitrate {
    type Error = String;

    fn try_from(kbps: u32) -> Result<Self, Self::Error> {
        if Self::SUPPORTED.contains(&kbps) {
            Ok(Self(kbps))
        } else {
            Err(format!(
                "unsupported AC-3 bitrate {kbps} (expected one of {:?})",
                Self::SUPPORTED
            ))
        }
    }
}

impl From<Ac3Bitrate> for u32 {
    fn from(bitrate: Ac3Bitrate) -> u32 {
        bitrate.0
    }
}

impl ArgumentValue for Ac3Bitrate {
    fn argument_string(&self) -> String {
        self.0.to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mixdown {
    #[default]
    Stereo,
    Dpl2,
}

keyword_value!(Mixdown {
    Stereo => "stereo",
    Dpl2 => "dpl2",
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioOptions {
    pub main_audio: Option<TrackName>,
    pub tracks: Vec<TrackName>,
    pub widths: BTreeMap<AudioTrack, TrackWidth>,
    pub reverse_double_order: bool,
    pub formats: Vec<AudioFormat>,
    pub keep_ac3_stereo: bool,
    pub ac3_encoder: Ac3Encoder,
    pub ac3_bitrate: Ac3Bitrate,
    pub pass_ac3_bitrate: Ac3Bitrate,
    pub copy_audio: Vec<AudioTrack>,
    pub copy_audio_names: Vec<AudioTrack>,
    pub aac_encoder: Option<String>,
    pub mixdown: Mixdown,
    pub no_audio: bool,
}

impl Optionable for AudioOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode(MAIN_AUDIO, self.main_audio.as_ref());
        options.encode_sequence(ADD_AUDIO, &self.tracks);
        options.encode_mapping(AUDIO_WIDTH, &self.widths);
        options.encode_flag(REVERSE_DOUBLE_ORDER, self.reverse_double_order, false);
        options.encode_sequence(AUDIO_FORMAT, &self.formats);
        options.encode_flag(KEEP_AC3_STEREO, self.keep_ac3_stereo, false);
        options.encode_value(AC3_ENCODER, &self.ac3_encoder, &Ac3Encoder::default());
        options.encode_value(AC3_BITRATE, &self.ac3_bitrate, &Ac3Bitrate::DEFAULT);
        options.encode_value(PASS_AC3_BITRATE, &self.pass_ac3_bitrate, &Ac3Bitrate::DEFAULT);
        options.encode_sequence(COPY_AUDIO, &self.copy_audio);
        options.encode_sequence(COPY_AUDIO_NAME, &self.copy_audio_names);
        options.encode(AAC_ENCODER, self.aac_encoder.as_deref());
        options.encode_value(MIXDOWN, &self.mixdown, &Mixdown::default());
        options.encode_flag(NO_AUDIO, self.no_audio, false);
    }
}
