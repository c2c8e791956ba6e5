//! Cropping, scaling, aspect ratio, frame rate and filter options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::advanced::KeyValueOption;
use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const CROP: ArgumentKey = ArgumentKey::new("crop");
const CONSTRAIN_CROP: ArgumentKey = ArgumentKey::new("constrain-crop");
const FALLBACK_CROP: ArgumentKey = ArgumentKey::new("fallback-crop");
const FIT_720P: ArgumentKey = ArgumentKey::new("720p");
const MAX_WIDTH: ArgumentKey = ArgumentKey::new("max-width");
const MAX_HEIGHT: ArgumentKey = ArgumentKey::new("max-height");
const PIXEL_ASPECT: ArgumentKey = ArgumentKey::new("pixel-aspect");
const FORCE_RATE: ArgumentKey = ArgumentKey::new("force-rate");
const LIMIT_RATE: ArgumentKey = ArgumentKey::new("limit-rate");
const FILTER: ArgumentKey = ArgumentKey::new("filter");

/// How much to crop from each edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropDimensions {
    Detect,
    Auto,
    #[default]
    None,
    Custom {
        top: u32,
        bottom: u32,
        left: u32,
        right: u32,
    },
}

impl fmt::Display for CropDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropDimensions::Detect => f.write_str("detect"),
            CropDimensions::Auto => f.write_str("auto"),
            CropDimensions::None => f.write_str("0:0:0:0"),
            CropDimensions::Custom {
                top,
                bottom,
                left,
                right,
            } => write!(f, "{top}:{bottom}:{left}:{right}"),
        }
    }
}

/// Accepts `detect`, `auto`, `none` or `top:bottom:left:right`.
impl FromStr for CropDimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "detect" => return Ok(CropDimensions::Detect),
            "auto" => return Ok(CropDimensions::Auto),
            "none" => return Ok(CropDimensions::None),
            _ => {}
        }
        let edges = s
            .split(':')
            .map(|edge| edge.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("invalid crop '{s}'"))?;
        match edges[..] {
            [0, 0, 0, 0] => Ok(CropDimensions::None),
            [top, bottom, left, right] => Ok(CropDimensions::Custom {
                top,
                bottom,
                left,
                right,
            }),
            _ => Err(format!("invalid crop '{s}' (expected T:B:L:R)")),
        }
    }
}

impl ArgumentValue for CropDimensions {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

/// Source of crop values when detection is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackCrop {
    Handbrake,
    Ffmpeg,
    Minimal,
    None,
}

keyword_value!(FallbackCrop {
    Handbrake => "handbrake",
    Ffmpeg => "ffmpeg",
    Minimal => "minimal",
    None => "none",
});

/// Pixel aspect ratio, `x:y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub x: u32,
    pub y: u32,
}

impl AspectRatio {
    pub const SQUARE: AspectRatio = AspectRatio { x: 1, y: 1 };
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl ArgumentValue for AspectRatio {
    fn argument_string(&self) -> String {
        format!("{}:{}", self.x, self.y)
    }
}

/// Output frame rate: either forced constant or a peak limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameRate {
    Forced(f64),
    Limit(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOptions {
    pub crop: CropDimensions,
    pub constrain_crop: bool,
    pub fallback_crop: Option<FallbackCrop>,
    /// Fit the output into 1280x720.
    pub fit_720p: bool,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub pixel_aspect: AspectRatio,
    pub frame_rate: Option<FrameRate>,
    pub filters: Vec<KeyValueOption>,
}

impl Optionable for VideoOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_value(CROP, &self.crop, &CropDimensions::default());
        options.encode_flag(CONSTRAIN_CROP, self.constrain_crop, false);
        options.encode(FALLBACK_CROP, self.fallback_crop.as_ref());
        options.encode_flag(FIT_720P, self.fit_720p, false);
        options.encode(MAX_WIDTH, self.max_width.as_ref());
        options.encode(MAX_HEIGHT, self.max_height.as_ref());
        options.encode_value(PIXEL_ASPECT, &self.pixel_aspect, &AspectRatio::default());

        let (forced, limit) = match self.frame_rate {
            Some(FrameRate::Forced(rate)) => (Some(rate), None),
            Some(FrameRate::Limit(rate)) => (None, Some(rate)),
            None => (None, None),
        };
        options.encode(FORCE_RATE, forced.as_ref());
        options.encode(LIMIT_RATE, limit.as_ref());

        options.encode_sequence(FILTER, &self.filters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crop() {
        assert_eq!("detect".parse(), Ok(CropDimensions::Detect));
        assert_eq!("0:0:0:0".parse(), Ok(CropDimensions::None));
        assert_eq!(
            "140:140:0:0".parse(),
            Ok(CropDimensions::Custom {
                top: 140,
                bottom: 140,
                left: 0,
                right: 0
            })
        );
        assert!("1:2:3".parse::<CropDimensions>().is_err());
    }

    #[test]
    fn test_default_crop_and_aspect_are_suppressed() {
        assert!(VideoOptions::default().build_options().is_empty());
    }

    #[test]
    fn test_explicit_values_are_encoded() {
        let video = VideoOptions {
            crop: CropDimensions::Custom {
                top: 140,
                bottom: 140,
                left: 0,
                right: 0,
            },
            fallback_crop: Some(FallbackCrop::Minimal),
            fit_720p: true,
            pixel_aspect: AspectRatio { x: 4, y: 3 },
            frame_rate: Some(FrameRate::Limit(23.976)),
            filters: vec![KeyValueOption::flag("deinterlace")],
            ..VideoOptions::default()
        };
        assert_eq!(
            video.build_options(),
            vec![
                "--crop=140:140:0:0",
                "--fallback-crop=minimal",
                "--720p",
                "--pixel-aspect=4:3",
                "--limit-rate=23.976",
                "--filter=deinterlace",
            ]
        );
    }
}
