//! The `run` subcommand: transcode one file with a live progress bar.

use std::time::{Duration, Instant};

use console::Term;
use log::{error, info, warn};
use transcoder_core::utils::format_elapsed;
use transcoder_core::{ExitReport, TerminationReason, Transcoder, TranscoderConfig, verify_tool};

use crate::cli::FileArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::TranscodeProgress;

const WAIT_SLICE: Duration = Duration::from_millis(250);

/// Runs the tool to completion and returns the exit code the CLI should use.
pub fn run_transcode(mut config: TranscoderConfig, args: &FileArgs) -> CliResult<i32> {
    // Ctrl-C at the terminal has to reach the tool as well as this process.
    config.own_process_group = false;
    let options = args.job.to_options()?;
    let tool = verify_tool(&config)?;

    let file_name = args
        .file
        .file_name()
        .cli_with_context(|| format!("'{}' does not name a file", args.file.display()))?
        .to_string_lossy()
        .into_owned();
    let progress = if Term::stderr().is_term() {
        TranscodeProgress::new(&file_name)
    } else {
        TranscodeProgress::hidden()
    };

    let observer = progress.clone();
    let transcoder = Transcoder::builder(tool, &args.file)
        .options(options)
        .config(config)
        .on_progress(move |snapshot| observer.update(snapshot))
        .on_complete(|finished| {
            info!("`{}` finished with {}", finished.command, finished.report);
        })
        .build()?;

    let started = Instant::now();
    transcoder.start()?;
    if let Some(command) = transcoder.command_line() {
        info!("Started {command}");
    }

    let report = loop {
        if let Some(result) = transcoder.wait_timeout(WAIT_SLICE) {
            break result?;
        }
    };

    if report.success() {
        progress.finish();
        info!(
            "Transcoded {} in {}",
            file_name,
            format_elapsed(started.elapsed())
        );
    } else {
        progress.abandon();
        error!("{} failed with {}", file_name, report);
        if let Some(line) = transcoder.stderr().last_line() {
            warn!("Last tool error output: {line}");
        }
    }
    Ok(exit_code(report))
}

/// The tool's exit code, or the shell convention `128 + signal` when it was killed.
pub fn exit_code(report: ExitReport) -> i32 {
    match report.reason {
        TerminationReason::Exit => report.exit_code,
        TerminationReason::UncaughtSignal => 128 + report.exit_code,
    }
}
