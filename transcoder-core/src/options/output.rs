//! Output file, container and bookkeeping options.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, OptionEncoder, Optionable};

const OUTPUT: ArgumentKey = ArgumentKey::new("output");
const MP4: ArgumentKey = ArgumentKey::new("mp4");
const M4V: ArgumentKey = ArgumentKey::new("m4v");
const CHAPTER_NAMES: ArgumentKey = ArgumentKey::new("chapter-names");
const NO_LOG: ArgumentKey = ArgumentKey::new("no-log");
const DRY_RUN: ArgumentKey = ArgumentKey::new("dry-run");

/// Container of the output file. Matroska is what the tool writes by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    #[default]
    Mkv,
    Mp4,
    M4v,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Output file or directory. The tool derives a name from the source when unset.
    pub output: Option<PathBuf>,
    pub format: ContainerFormat,
    /// CSV file with chapter names.
    pub chapter_names: Option<PathBuf>,
    pub no_log: bool,
    pub dry_run: bool,
}

impl Optionable for OutputOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode(OUTPUT, self.output.as_deref());
        options.encode_flag(MP4, self.format == ContainerFormat::Mp4, false);
        options.encode_flag(M4V, self.format == ContainerFormat::M4v, false);
        options.encode(CHAPTER_NAMES, self.chapter_names.as_deref());
        options.encode_flag(NO_LOG, self.no_log, false);
        options.encode_flag(DRY_RUN, self.dry_run, false);
    }
}
