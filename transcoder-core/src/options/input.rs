//! Input selection: which title and chapters of the source to transcode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, ArgumentValue, OptionEncoder, Optionable};

const SCAN: ArgumentKey = ArgumentKey::new("scan");
const TITLE: ArgumentKey = ArgumentKey::new("title");
const CHAPTERS: ArgumentKey = ArgumentKey::new("chapters");

/// A single chapter or an inclusive chapter range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    pub start: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl ChapterRange {
    #[must_use]
    pub fn single(chapter: u32) -> Self {
        Self {
            start: chapter,
            end: None,
        }
    }

    #[must_use]
    pub fn range(start: u32, end: u32) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }
}

impl fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}", self.start),
        }
    }
}

impl ArgumentValue for ChapterRange {
    fn argument_string(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputOptions {
    /// Only print information about the source, do not transcode.
    pub scan: bool,
    pub title: Option<u32>,
    pub chapters: Option<ChapterRange>,
}

impl Optionable for InputOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_flag(SCAN, self.scan, false);
        options.encode(TITLE, self.title.as_ref());
        options.encode(CHAPTERS, self.chapters.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_range_rendering() {
        let input = InputOptions {
            scan: true,
            title: Some(1),
            chapters: Some(ChapterRange::range(3, 7)),
        };
        assert_eq!(
            input.build_options(),
            vec!["--scan", "--title=1", "--chapters=3-7"]
        );
        assert_eq!(ChapterRange::single(4).to_string(), "4");
    }
}
