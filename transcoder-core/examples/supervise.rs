//! Runs `transcode-video` on one file and prints progress as it changes.
//!
//! Usage: cargo run --example supervise -- /path/to/Movie.mkv [--dry-run]

use std::env;
use std::process;

use transcoder_core::options::TranscoderOptions;
use transcoder_core::{Transcoder, TranscoderConfig, format_eta, verify_tool};

fn main() {
    let mut args = env::args().skip(1);
    let Some(source) = args.next() else {
        eprintln!("usage: supervise <FILE> [--dry-run]");
        process::exit(2);
    };

    let mut options = TranscoderOptions::default();
    options.output.dry_run = args.any(|arg| arg == "--dry-run");

    let config = TranscoderConfig::from_env();
    let result = verify_tool(&config).and_then(|tool| {
        let transcoder = Transcoder::builder(tool, source)
            .options(options)
            .config(config)
            .on_progress(|snapshot| {
                println!("{:6.2}%  ETA {}", snapshot.percent, format_eta(snapshot.eta));
            })
            .build()?;
        println!("{}", transcoder.arguments()?.join(" "));
        transcoder.start()?;
        transcoder.finish()
    });

    match result {
        Ok(report) => {
            println!("finished with {report}");
            process::exit(if report.success() { 0 } else { 1 });
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
