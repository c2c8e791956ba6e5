// transcoder-cli/src/lib.rs
//
// Library portion of the transcoder CLI: argument definitions and command
// logic, shared by the binary and its tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

pub use cli::{Cli, Commands, FileArgs, JobArgs};
pub use commands::args::run_args;
pub use commands::check::run_check;
pub use commands::run::run_transcode;
