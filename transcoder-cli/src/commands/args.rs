//! The `args` subcommand: print the argument vector without running anything.

use log::debug;
use transcoder_core::{Transcoder, TranscoderConfig, verify_tool};

use crate::cli::FileArgs;
use crate::error::CliResult;

/// Prints one argument per line; the absolute source path comes last.
pub fn run_args(config: TranscoderConfig, args: &FileArgs) -> CliResult<()> {
    let options = args.job.to_options()?;
    let tool = verify_tool(&config)?;
    let transcoder = Transcoder::builder(tool, &args.file)
        .options(options)
        .config(config)
        .build()?;

    let arguments = transcoder.arguments()?;
    debug!("{} argument(s) for {}", arguments.len(), args.file.display());
    for argument in arguments {
        println!("{argument}");
    }
    Ok(())
}
