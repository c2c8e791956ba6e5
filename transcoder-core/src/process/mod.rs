// ============================================================================
// transcoder-core/src/process/mod.rs
// ============================================================================
//
// PROCESS SUPERVISION: Running `transcode-video` and watching its output
//
// KEY COMPONENTS:
// - LineSource (push/poll) + LineSplitter: stdout as a stream of lines
// - ProgressExtractor + ProgressTracker: percent and ETA from those lines
// - ProcessSpawner / StdSpawner: process creation seam
// - Transcoder: the lifecycle state machine tying it all together

mod line_source;
mod output;
mod progress;
mod signal;
mod spawner;
mod supervisor;

pub use line_source::{
    CancelToken, LineSource, LineSourceKind, LineSplitter, PollLineSource, PushLineSource,
    line_source_for, on_output,
};
pub use output::{MAX_RETAINED_LINES, OutputStream};
pub use progress::{
    Eta, LatchedLine, ProgressExtractor, ProgressSnapshot, ProgressTracker, parse_eta,
    parse_progress,
};
pub use signal::ControlSignal;
pub use spawner::{CommandLine, ProcessSpawner, StdSpawner};
pub use supervisor::{
    ExitReport, FinishedProcess, TerminationReason, TranscodeState, Transcoder, TranscoderBuilder,
};
