//! Video encoder, rate control and target bitrate options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const ENCODER: ArgumentKey = ArgumentKey::new("encoder");
const ABR: ArgumentKey = ArgumentKey::new("abr");
const SIMPLE: ArgumentKey = ArgumentKey::new("simple");
const AVBR: ArgumentKey = ArgumentKey::new("avbr");
const TARGET: ArgumentKey = ArgumentKey::new("target");
const QUICK: ArgumentKey = ArgumentKey::new("quick");
const VERYQUICK: ArgumentKey = ArgumentKey::new("veryquick");
const PRESET: ArgumentKey = ArgumentKey::new("preset");

/// The encoder `transcode-video` selects when none is given.
pub const DEFAULT_VIDEO_ENCODER: &str = "x264";

/// Name of a HandBrake video encoder, e.g. `x264`, `x265` or `vt_h265`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoEncoder(String);

impl VideoEncoder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn x264() -> Self {
        Self::new("x264")
    }

    #[must_use]
    pub fn x265() -> Self {
        Self::new("x265")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for VideoEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_ENCODER)
    }
}

impl ArgumentValue for VideoEncoder {
    fn argument_string(&self) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateControl {
    Abr,
    Simple,
    Avbr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSize {
    Small,
    Big,
}

keyword_value!(TargetSize {
    Small => "small",
    Big => "big",
});

/// Resolution class a target bitrate applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "2160p")]
    Uhd,
    #[serde(rename = "1080p")]
    Hd,
    #[serde(rename = "720p")]
    Hq,
    #[serde(rename = "480p")]
    Sd,
}

keyword_value!(Resolution {
    Uhd => "2160p",
    Hd => "1080p",
    Hq => "720p",
    Sd => "480p",
});

/// Target video bitrate in Kbps, optionally scoped to one resolution class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBitrate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    pub kbps: u32,
}

impl TargetBitrate {
    #[must_use]
    pub fn new(kbps: u32) -> Self {
        Self {
            resolution: None,
            kbps,
        }
    }

    #[must_use]
    pub fn for_resolution(resolution: Resolution, kbps: u32) -> Self {
        Self {
            resolution: Some(resolution),
            kbps,
        }
    }
}

impl fmt::Display for TargetBitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resolution {
            Some(resolution) => write!(f, "{}={}", resolution.as_str(), self.kbps),
            None => write!(f, "{}", self.kbps),
        }
    }
}

/// Parses `kbps` or `resolution=kbps`, e.g. `1080p=6000`.
impl FromStr for TargetBitrate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_kbps = |kbps: &str| {
            kbps.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid bitrate '{kbps}'"))
        };
        match s.split_once('=') {
            Some((resolution, kbps)) => {
                Ok(Self::for_resolution(resolution.parse()?, parse_kbps(kbps)?))
            }
            None => Ok(Self::new(parse_kbps(s)?)),
        }
    }
}

impl ArgumentValue for TargetBitrate {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscodeSpeed {
    Quick,
    Veryquick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderPreset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

keyword_value!(EncoderPreset {
    Ultrafast => "ultrafast",
    Superfast => "superfast",
    Veryfast => "veryfast",
    Faster => "faster",
    Fast => "fast",
    Medium => "medium",
    Slow => "slow",
    Slower => "slower",
    Veryslow => "veryslow",
    Placebo => "placebo",
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityOptions {
    pub encoder: VideoEncoder,
    pub rate_control: Option<RateControl>,
    pub size: Option<TargetSize>,
    pub bitrates: Vec<TargetBitrate>,
    pub speed: Option<TranscodeSpeed>,
    pub preset: Option<EncoderPreset>,
}

impl Optionable for QualityOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_value(ENCODER, &self.encoder, &VideoEncoder::default());
        options.encode_flag(ABR, self.rate_control == Some(RateControl::Abr), false);
        options.encode_flag(SIMPLE, self.rate_control == Some(RateControl::Simple), false);
        options.encode_flag(AVBR, self.rate_control == Some(RateControl::Avbr), false);
        options.encode(TARGET, self.size.as_ref());
        options.encode_sequence(TARGET, &self.bitrates);
        options.encode_flag(QUICK, self.speed == Some(TranscodeSpeed::Quick), false);
        options.encode_flag(VERYQUICK, self.speed == Some(TranscodeSpeed::Veryquick), false);
        options.encode(PRESET, self.preset.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_bitrate() {
        assert_eq!("5000".parse(), Ok(TargetBitrate::new(5000)));
        assert_eq!(
            "1080p=6000".parse(),
            Ok(TargetBitrate::for_resolution(Resolution::Hd, 6000))
        );
        assert!("999p=6000".parse::<TargetBitrate>().is_err());
        assert!("fast".parse::<TargetBitrate>().is_err());
        assert_eq!("Slow".parse(), Ok(EncoderPreset::Slow));
    }

    #[test]
    fn test_default_encoder_is_suppressed() {
        assert!(QualityOptions::default().build_options().is_empty());
    }

    #[test]
    fn test_targets_are_repeated_in_order() {
        let quality = QualityOptions {
            encoder: VideoEncoder::x265(),
            rate_control: Some(RateControl::Avbr),
            size: Some(TargetSize::Small),
            bitrates: vec![
                TargetBitrate::for_resolution(Resolution::Uhd, 12000),
                TargetBitrate::new(5000),
            ],
            speed: Some(TranscodeSpeed::Veryquick),
            preset: Some(EncoderPreset::Veryslow),
        };
        assert_eq!(
            quality.build_options(),
            vec![
                "--encoder=x265",
                "--avbr",
                "--target=small",
                "--target=2160p=12000",
                "--target=5000",
                "--veryquick",
                "--preset=veryslow",
            ]
        );
    }
}
