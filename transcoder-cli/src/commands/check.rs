//! The `check` subcommand: is a compatible `transcode-video` installed?

use log::info;
use transcoder_core::{TranscoderConfig, verify_tool};

use crate::error::CliResult;

/// Verifies the tool and prints where it was found.
pub fn run_check(config: &TranscoderConfig) -> CliResult<()> {
    let tool = verify_tool(config)?;
    info!(
        "Required version: {}.{}.x",
        config.required_version.0, config.required_version.1
    );
    println!("{} {}", tool.program().display(), tool.version());
    Ok(())
}
