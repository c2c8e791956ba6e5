//! Command implementations for the CLI.

pub mod args;
pub mod check;
pub mod run;

use transcoder_core::TranscoderConfig;

use crate::cli::Cli;
use crate::error::CliResult;

/// Environment-derived configuration with the global flags applied on top.
pub fn build_config(cli: &Cli) -> CliResult<TranscoderConfig> {
    let mut config = TranscoderConfig::from_env();
    if let Some(tool) = &cli.tool {
        config.tool = tool.clone();
    }
    if let Some(line_source) = cli.line_source {
        config.line_source = line_source;
    }
    config.validate()?;
    Ok(config)
}
