// ============================================================================
// transcoder-cli/src/cli.rs
// ============================================================================
//
// COMMAND-LINE INTERFACE: Argument definitions for the transcoder binary
//
// KEY COMPONENTS:
// - Cli: global flags shared by every subcommand
// - Commands: check / args / run
// - JobArgs: the common job flags, layered on top of an optional JSON file

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use transcoder_core::options::{
    ContainerFormat, CropDimensions, Diagnostics, EncoderPreset, KeyValueOption, SubtitleTrack,
    TargetBitrate, TargetSize, TrackName, TranscodeSpeed, VideoEncoder,
};
use transcoder_core::{CoreResult, LineSourceKind, TranscoderOptions};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Transcoder: supervise transcode-video runs",
    long_about = "Builds argument lists for `transcode-video`, checks that a compatible \
                  release is installed, and runs it while reporting progress."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output for troubleshooting
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a timestamped file in this directory instead of the console
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Path or name of the transcode-video executable
    #[arg(long, global = true, value_name = "PATH", env = "TRANSCODER_TOOL")]
    pub tool: Option<PathBuf>,

    /// How tool output is read: push (blocking reads) or poll (timed polling)
    #[arg(long, global = true, value_name = "KIND")]
    pub line_source: Option<LineSourceKind>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify that a compatible transcode-video is installed
    Check,
    /// Print the argument list that would be passed to transcode-video
    Args(FileArgs),
    /// Run transcode-video on a file and report its progress
    Run(FileArgs),
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Video file to transcode
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub job: JobArgs,
}

/// `--target` takes either a size class or a bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Size(TargetSize),
    Bitrate(TargetBitrate),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<TargetSize>() {
            Ok(size) => Ok(Target::Size(size)),
            Err(_) => s.parse().map(Target::Bitrate).map_err(|_| {
                format!("invalid target '{s}' (expected small, big, KBPS or RES=KBPS)")
            }),
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct JobArgs {
    /// JSON file holding a full set of job options; flags below override it
    #[arg(long, value_name = "JSON")]
    pub options_file: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write an MP4 container
    #[arg(long, conflicts_with = "m4v")]
    pub mp4: bool,

    /// Write an M4V container
    #[arg(long)]
    pub m4v: bool,

    /// Video encoder name (e.g. x264, x265, vt_h264)
    #[arg(long, value_name = "NAME")]
    pub encoder: Option<String>,

    /// Encoder preset (ultrafast .. placebo)
    #[arg(long, value_name = "PRESET")]
    pub preset: Option<EncoderPreset>,

    /// Size class or target bitrate: small, big, KBPS or RES=KBPS (repeatable)
    #[arg(long, value_name = "TARGET")]
    pub target: Vec<Target>,

    /// Crop: detect, auto, none or T:B:L:R
    #[arg(long, value_name = "CROP")]
    pub crop: Option<CropDimensions>,

    /// Main audio track, optionally named: TRACK[=NAME]
    #[arg(long, value_name = "TRACK")]
    pub main_audio: Option<TrackName>,

    /// Additional audio track (repeatable)
    #[arg(long, value_name = "TRACK")]
    pub add_audio: Vec<TrackName>,

    /// Additional subtitle track (repeatable)
    #[arg(long, value_name = "TRACK")]
    pub add_subtitle: Vec<SubtitleTrack>,

    /// Subtitle track to burn into the video
    #[arg(long, value_name = "TRACK")]
    pub burn_subtitle: Option<SubtitleTrack>,

    /// Trade precision for speed
    #[arg(long, conflicts_with = "veryquick")]
    pub quick: bool,

    /// Trade even more precision for speed
    #[arg(long)]
    pub veryquick: bool,

    /// Let the tool print its HandBrakeCLI command without encoding
    #[arg(long)]
    pub dry_run: bool,

    /// Do not let the tool write its own log file
    #[arg(long)]
    pub no_log: bool,

    /// Encoder option NAME[=VALUE], or _NAME to disable (repeatable)
    #[arg(long, value_name = "OPTION", allow_hyphen_values = true)]
    pub encoder_option: Vec<KeyValueOption>,

    /// HandBrakeCLI option NAME[=VALUE], or _NAME to disable (repeatable)
    #[arg(long, value_name = "OPTION", allow_hyphen_values = true)]
    pub handbrake_option: Vec<KeyValueOption>,

    /// Ask the tool for verbose output
    #[arg(long, conflicts_with = "tool_quiet")]
    pub tool_verbose: bool,

    /// Ask the tool for quiet output
    #[arg(long)]
    pub tool_quiet: bool,
}

impl JobArgs {
    /// Loads the options file (if any) and applies the flags on top of it.
    pub fn to_options(&self) -> CoreResult<TranscoderOptions> {
        let mut options = match &self.options_file {
            Some(path) => TranscoderOptions::from_json_file(path)?,
            None => TranscoderOptions::default(),
        };
        self.apply(&mut options);
        Ok(options)
    }

    fn apply(&self, options: &mut TranscoderOptions) {
        if let Some(output) = &self.output {
            options.output.output = Some(output.clone());
        }
        if self.mp4 {
            options.output.format = ContainerFormat::Mp4;
        } else if self.m4v {
            options.output.format = ContainerFormat::M4v;
        }
        options.output.dry_run |= self.dry_run;
        options.output.no_log |= self.no_log;

        if let Some(encoder) = &self.encoder {
            options.quality.encoder = VideoEncoder::new(encoder.as_str());
        }
        if self.preset.is_some() {
            options.quality.preset = self.preset;
        }
        for target in &self.target {
            match *target {
                Target::Size(size) => options.quality.size = Some(size),
                Target::Bitrate(bitrate) => options.quality.bitrates.push(bitrate),
            }
        }
        if self.quick {
            options.quality.speed = Some(TranscodeSpeed::Quick);
        } else if self.veryquick {
            options.quality.speed = Some(TranscodeSpeed::Veryquick);
        }

        if let Some(crop) = self.crop {
            options.video.crop = crop;
        }

        if let Some(main_audio) = &self.main_audio {
            options.audio.main_audio = Some(main_audio.clone());
        }
        options.audio.tracks.extend(self.add_audio.iter().cloned());

        options
            .subtitles
            .tracks
            .extend(self.add_subtitle.iter().cloned());
        if let Some(burn) = &self.burn_subtitle {
            options.subtitles.burn = Some(burn.clone());
        }

        options
            .advanced
            .encoder_options
            .extend(self.encoder_option.iter().cloned());
        options
            .advanced
            .handbrake_options
            .extend(self.handbrake_option.iter().cloned());

        if self.tool_verbose {
            options.diagnostics.level = Some(Diagnostics::Verbose);
        } else if self.tool_quiet {
            options.diagnostics.level = Some(Diagnostics::Quiet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcoder_core::arguments::quote_value;
    use transcoder_core::options::Resolution;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_flags_map_onto_options() {
        let cli = parse(&[
            "transcoder",
            "run",
            "movie.mkv",
            "--preset",
            "slow",
            "--target",
            "big",
            "--target",
            "1080p=6000",
            "--quick",
            "--mp4",
            "--handbrake-option",
            "stop-at=duration:30",
        ]);
        let Commands::Run(file_args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(file_args.file, PathBuf::from("movie.mkv"));

        let options = file_args.job.to_options().unwrap();
        assert_eq!(options.quality.preset, Some(EncoderPreset::Slow));
        assert_eq!(options.quality.size, Some(TargetSize::Big));
        assert_eq!(
            options.quality.bitrates,
            vec![TargetBitrate::for_resolution(Resolution::Hd, 6000)]
        );
        assert_eq!(options.quality.speed, Some(TranscodeSpeed::Quick));
        assert_eq!(options.output.format, ContainerFormat::Mp4);
        assert_eq!(
            options.build_arguments(),
            vec![
                "--mp4",
                "--target=big",
                "--target=1080p=6000",
                "--quick",
                "--preset=slow",
                "--handbrake-option=stop-at=duration:30",
            ]
        );
    }

    #[test]
    fn test_relative_output_is_passed_as_absolute() {
        let cli = parse(&["transcoder", "args", "movie.mkv", "--output", "out/movie.m4v"]);
        let Commands::Args(file_args) = cli.command else {
            panic!("expected args");
        };
        let options = file_args.job.to_options().unwrap();
        let expected = std::env::current_dir().unwrap().join("out/movie.m4v");
        let expected = quote_value(&expected.to_string_lossy()).into_owned();
        assert_eq!(options.build_arguments(), vec![format!("--output={expected}")]);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["transcoder", "check", "--line-source", "push", "--verbose"]);
        assert!(matches!(cli.command, Commands::Check));
        assert!(cli.verbose);
        assert_eq!(cli.line_source, Some(LineSourceKind::Push));
    }

    #[test]
    fn test_conflicting_speed_flags_are_rejected() {
        let result = Cli::try_parse_from(["transcoder", "args", "a.mkv", "--quick", "--veryquick"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let result = Cli::try_parse_from(["transcoder", "args", "a.mkv", "--target", "huge"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flags_override_options_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("job.json");
        std::fs::write(
            &file,
            r#"{"quality": {"preset": "fast"}, "output": {"dry_run": true}}"#,
        )
        .unwrap();

        let job = JobArgs {
            options_file: Some(file),
            preset: Some(EncoderPreset::Veryslow),
            ..JobArgs::default()
        };
        let options = job.to_options().unwrap();
        assert_eq!(options.quality.preset, Some(EncoderPreset::Veryslow));
        assert!(options.output.dry_run);
    }
}
