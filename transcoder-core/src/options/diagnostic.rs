use serde::{Deserialize, Serialize};

use crate::arguments::{ArgumentKey, OptionEncoder, Optionable};

const VERBOSE: ArgumentKey = ArgumentKey::new("verbose");
const QUIET: ArgumentKey = ArgumentKey::new("quiet");

/// How chatty the tool itself should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagnostics {
    Verbose,
    Quiet,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticOptions {
    pub level: Option<Diagnostics>,
}

impl Optionable for DiagnosticOptions {
    fn encode(&self, options: &mut OptionEncoder) {
        options.encode_flag(VERBOSE, self.level == Some(Diagnostics::Verbose), false);
        options.encode_flag(QUIET, self.level == Some(Diagnostics::Quiet), false);
    }
}
