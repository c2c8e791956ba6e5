// ============================================================================
// transcoder-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: parse arguments, set up logging, dispatch the subcommand.
//
// Exit codes: 0 on success, 1 on any setup error, and for `run` the exit
// code of `transcode-video` itself.

use std::process;

use clap::Parser;
use console::style;
use log::debug;
use transcoder_cli::commands::build_config;
use transcoder_cli::error::CliResult;
use transcoder_cli::{Cli, Commands, logging, run_args, run_check, run_transcode};

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Check => "check",
        Commands::Args(_) => "args",
        Commands::Run(_) => "run",
    }
}

fn dispatch(cli: Cli) -> CliResult<i32> {
    match &cli.log_dir {
        Some(log_dir) => {
            let log_file = logging::init_file(log_dir, command_name(&cli.command), cli.verbose)?;
            eprintln!("Logging to {}", log_file.display());
        }
        None => logging::init_console(cli.verbose),
    }
    debug!("Parsed arguments: {cli:?}");

    let config = build_config(&cli)?;
    match &cli.command {
        Commands::Check => run_check(&config).map(|()| 0),
        Commands::Args(args) => run_args(config, args).map(|()| 0),
        Commands::Run(args) => run_transcode(config, args),
    }
}

fn main() {
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            process::exit(1);
        }
    }
}
