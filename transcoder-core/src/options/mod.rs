//! Typed option groups for a `transcode-video` job.
//!
//! Each group owns the inherent defaults of its fields and describes itself to
//! an [`OptionEncoder`](crate::arguments::OptionEncoder). [`TranscoderOptions`]
//! strings the groups together in a fixed order. All groups are serde
//! serializable so a whole job can be stored as JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::arguments::{OptionEncoder, Optionable};
use crate::error::{CoreError, CoreResult};

/// Implements `as_str`, `FromStr` and `ArgumentValue` for a unit-only enum.
macro_rules! keyword_value {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// The keyword used on the command line.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown value '{other}' (expected one of: {})",
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl $crate::arguments::ArgumentValue for $ty {
            fn argument_string(&self) -> String {
                self.as_str().to_string()
            }
        }
    };
}

pub mod advanced;
pub mod audio;
pub mod diagnostic;
pub mod external_subtitle;
pub mod input;
pub mod output;
pub mod quality;
pub mod subtitle;
pub mod video;

pub use advanced::{AdvancedOptions, KeyValueOption};
pub use audio::{
    Ac3Bitrate, Ac3Encoder, AudioCodec, AudioFormat, AudioOptions, AudioTrack, FormatTarget,
    Mixdown, TrackName, TrackWidth,
};
pub use diagnostic::{DiagnosticOptions, Diagnostics};
pub use external_subtitle::{ExternalSubtitle, ExternalSubtitleOptions};
pub use input::{ChapterRange, InputOptions};
pub use output::{ContainerFormat, OutputOptions};
pub use quality::{
    EncoderPreset, QualityOptions, RateControl, Resolution, TargetBitrate, TargetSize,
    TranscodeSpeed, VideoEncoder,
};
pub use subtitle::{SubtitleOptions, SubtitleTrack};
pub use video::{AspectRatio, CropDimensions, FallbackCrop, FrameRate, VideoOptions};

/// Every option group of a job, encoded in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderOptions {
    pub input: InputOptions,
    pub output: OutputOptions,
    pub quality: QualityOptions,
    pub video: VideoOptions,
    pub audio: AudioOptions,
    pub subtitles: SubtitleOptions,
    pub external_subtitles: ExternalSubtitleOptions,
    pub advanced: AdvancedOptions,
    pub diagnostics: DiagnosticOptions,
}

impl TranscoderOptions {
    /// Renders every group into the argument vector (without the source file).
    #[must_use]
    pub fn build_arguments(&self) -> Vec<String> {
        self.build_options()
    }

    /// Parses options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads options from a JSON file. Missing groups and fields take their defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text).map_err(|source| CoreError::OptionsFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Optionable for TranscoderOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_group(&self.input);
        options.encode_group(&self.output);
        options.encode_group(&self.quality);
        options.encode_group(&self.video);
        options.encode_group(&self.audio);
        options.encode_group(&self.subtitles);
        options.encode_group(&self.external_subtitles);
        options.encode_group(&self.advanced);
        options.encode_group(&self.diagnostics);
    }
}
