//! External `.srt` subtitle files.
//!
//! Every forced or added file is followed by its language, encoding and
//! offset bindings. Each binding is dropped when it holds the tool's default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, OptionEncoder, Optionable};

const BURN_SRT: ArgumentKey = ArgumentKey::new("burn-srt");
const FORCE_SRT: ArgumentKey = ArgumentKey::new("force-srt");
const ADD_SRT: ArgumentKey = ArgumentKey::new("add-srt");
const BIND_SRT_LANGUAGE: ArgumentKey = ArgumentKey::new("bind-srt-language");
const BIND_SRT_ENCODING: ArgumentKey = ArgumentKey::new("bind-srt-encoding");
const BIND_SRT_OFFSET: ArgumentKey = ArgumentKey::new("bind-srt-offset");

pub const DEFAULT_SRT_LANGUAGE: &str = "und";
pub const DEFAULT_SRT_ENCODING: &str = "latin1";
pub const DEFAULT_SRT_OFFSET: i32 = 0;

fn default_language() -> String {
    DEFAULT_SRT_LANGUAGE.to_string()
}

fn default_encoding() -> String {
    DEFAULT_SRT_ENCODING.to_string()
}

/// One subtitle file with its bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSubtitle {
    pub file: PathBuf,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// Offset in milliseconds.
    #[serde(default)]
    pub offset: i32,
}

impl ExternalSubtitle {
    #[must_use]
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            language: default_language(),
            encoding: default_encoding(),
            offset: DEFAULT_SRT_OFFSET,
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    fn encode_as(&self, key: ArgumentKey, options: &mut OptionEncoder) {
        options.encode(key, Some(self.file.as_path()));
        options.encode_value(BIND_SRT_LANGUAGE, self.language.as_str(), DEFAULT_SRT_LANGUAGE);
        options.encode_value(BIND_SRT_ENCODING, self.encoding.as_str(), DEFAULT_SRT_ENCODING);
        options.encode_value(BIND_SRT_OFFSET, &self.offset, &DEFAULT_SRT_OFFSET);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalSubtitleOptions {
    pub burn: Option<PathBuf>,
    pub forced: Vec<ExternalSubtitle>,
    pub added: Vec<ExternalSubtitle>,
}

impl Optionable for ExternalSubtitleOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode(BURN_SRT, self.burn.as_deref());
        for subtitle in &self.forced {
            subtitle.encode_as(FORCE_SRT, options);
        }
        for subtitle in &self.added {
            subtitle.encode_as(ADD_SRT, options);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings_are_dropped() {
        let subtitles = ExternalSubtitleOptions {
            added: vec![ExternalSubtitle::new("/subs/movie.srt")],
            ..ExternalSubtitleOptions::default()
        };
        assert_eq!(subtitles.build_options(), vec!["--add-srt=/subs/movie.srt"]);
    }

    #[test]
    fn test_bindings_follow_their_file() {
        let subtitles = ExternalSubtitleOptions {
            burn: None,
            forced: vec![
                ExternalSubtitle::new("/subs/forced.srt")
                    .with_language("eng")
                    .with_offset(-250),
            ],
            added: vec![ExternalSubtitle::new("/subs/My Film.srt").with_encoding("utf8")],
        };
        assert_eq!(
            subtitles.build_options(),
            vec![
                "--force-srt=/subs/forced.srt",
                "--bind-srt-language=eng",
                "--bind-srt-offset=-250",
                "--add-srt=\"/subs/My Film.srt\"",
                "--bind-srt-encoding=utf8",
            ]
        );
    }
}
