//! Delivery of control signals to the running tool.

use std::io;
use std::process::Child;

/// Control requests the supervisor can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// SIGTERM
    Terminate,
    /// SIGINT
    Interrupt,
    /// SIGSTOP
    Suspend,
    /// SIGCONT
    Resume,
}

/// Signals the tool's whole process group, or just the tool when it does not
/// lead a group of its own.
#[cfg(unix)]
pub(crate) fn send(child: &mut Child, signal: ControlSignal) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::unistd::Pid;

    let signal = match signal {
        ControlSignal::Terminate => Signal::SIGTERM,
        ControlSignal::Interrupt => Signal::SIGINT,
        ControlSignal::Suspend => Signal::SIGSTOP,
        ControlSignal::Resume => Signal::SIGCONT,
    };
    let pid = i32::try_from(child.id())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    let pid = Pid::from_raw(pid);
    match killpg(pid, signal) {
        Err(Errno::ESRCH) => kill(pid, signal),
        result => result,
    }
    .map_err(io::Error::from)
}

/// Only termination is possible here, through `Child::kill`.
#[cfg(not(unix))]
pub(crate) fn send(child: &mut Child, signal: ControlSignal) -> io::Result<()> {
    match signal {
        ControlSignal::Terminate | ControlSignal::Interrupt => child.kill(),
        ControlSignal::Suspend | ControlSignal::Resume => Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "suspend and resume need unix signals",
        )),
    }
}
