// ============================================================================
// transcoder-core/src/process/supervisor.rs
// ============================================================================
//
// PROCESS SUPERVISOR: Lifecycle of one `transcode-video` run
//
// KEY COMPONENTS:
// - Transcoder: start / stop / interrupt / suspend / resume / wait / finish
// - TranscoderBuilder: options, config, spawner and callbacks
// - ExitReport / TerminationReason: how the process ended
// - FinishedProcess: what the completion callback receives
//
// THREADS PER RUN:
// - drain: feeds stdout lines to the ProgressExtractor (sole progress writer)
// - stderr: collects stderr and echoes it at debug level
// - monitor: owns reaping; polls `try_wait`, joins the other two, publishes
//   the ExitReport and fires the completion callback once
//
// The child handle is dropped by the monitor under the same lock that signal
// delivery takes, so a signal is never sent to a pid that was already reaped.
// Once a run is cancelled the monitor waits at most CANCELLED_READER_GRACE for
// the reader threads; a helper that outlived the tool can hold the pipes open.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ExitStatus};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::line_source::{CancelToken, LineSplitter, line_source_for, on_output};
use super::output::OutputStream;
use super::progress::{Eta, ProgressExtractor, ProgressSnapshot, ProgressTracker};
use super::signal::{self, ControlSignal};
use super::spawner::{CommandLine, ProcessSpawner, StdSpawner};
use crate::config::TranscoderConfig;
use crate::error::{CoreError, CoreResult, command_wait_error};
use crate::external::VerifiedTool;
use crate::options::TranscoderOptions;

const STDERR_CHUNK_SIZE: usize = 4096;

/// How long reader threads may keep running after a cancelled run was reaped.
const CANCELLED_READER_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle of a [`Transcoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TranscodeState {
    NotStarted,
    Running,
    Suspended,
    Completed,
    Cancelled,
}

impl fmt::Display for TranscodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TranscodeState::NotStarted => "not started",
            TranscodeState::Running => "running",
            TranscodeState::Suspended => "suspended",
            TranscodeState::Completed => "completed",
            TranscodeState::Cancelled => "cancelled",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The process returned an exit code.
    Exit,
    /// The process was killed by a signal it did not handle.
    UncaughtSignal,
}

/// How the process ended. For signaled processes `exit_code` is the signal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitReport {
    pub exit_code: i32,
    pub reason: TerminationReason,
}

impl ExitReport {
    #[must_use]
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self {
                exit_code: code,
                reason: TerminationReason::Exit,
            };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Self {
                    exit_code: signal,
                    reason: TerminationReason::UncaughtSignal,
                };
            }
        }
        Self {
            exit_code: -1,
            reason: TerminationReason::Exit,
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.reason == TerminationReason::Exit && self.exit_code == 0
    }
}

impl fmt::Display for ExitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            TerminationReason::Exit => write!(f, "exit code {}", self.exit_code),
            TerminationReason::UncaughtSignal => write!(f, "signal {}", self.exit_code),
        }
    }
}

/// A terminated run, handed to the completion callback.
#[derive(Debug, Clone)]
pub struct FinishedProcess {
    pub pid: u32,
    pub command: CommandLine,
    pub stdout: OutputStream,
    pub stderr: OutputStream,
    pub report: ExitReport,
}

type CompletionCallback = Box<dyn FnOnce(&FinishedProcess) + Send>;
type ProgressObserver = Box<dyn FnMut(ProgressSnapshot) + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The exit status of the child could not be collected.
#[derive(Debug, Clone)]
struct WaitFailure {
    command: String,
    kind: io::ErrorKind,
    message: String,
}

impl WaitFailure {
    fn new(command: &CommandLine, error: &io::Error) -> Self {
        Self {
            command: command.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    fn to_error(&self) -> CoreError {
        let source = io::Error::new(self.kind, self.message.clone());
        command_wait_error(self.command.clone(), source)
    }
}

type Outcome = Result<ExitReport, WaitFailure>;

fn outcome_result(outcome: &Outcome) -> CoreResult<ExitReport> {
    outcome.clone().map_err(|failure| failure.to_error())
}

/// State shared between the caller and the monitor thread.
#[derive(Debug)]
struct Shared {
    state: Mutex<TranscodeState>,
    child: Mutex<Option<Child>>,
    exit: Mutex<Option<Outcome>>,
    exited: Condvar,
}

#[derive(Debug, Clone)]
struct RunInfo {
    pid: u32,
    command: CommandLine,
}

/// Builder for [`Transcoder`].
pub struct TranscoderBuilder {
    tool: VerifiedTool,
    source: PathBuf,
    options: TranscoderOptions,
    config: TranscoderConfig,
    spawner: Option<Arc<dyn ProcessSpawner>>,
    on_complete: Option<CompletionCallback>,
    on_progress: Option<ProgressObserver>,
}

impl TranscoderBuilder {
    #[must_use]
    pub fn options(mut self, options: TranscoderOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn config(mut self, config: TranscoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the process spawner.
    ///
    /// Defaults to a [`StdSpawner`] honouring
    /// [`own_process_group`](TranscoderConfig::own_process_group).
    #[must_use]
    pub fn spawner(mut self, spawner: Arc<dyn ProcessSpawner>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    /// Called exactly once, after the process terminated and its output was drained.
    ///
    /// Runs on the monitor thread before [`Transcoder::wait`] returns, so it
    /// must not wait on the transcoder itself. It is skipped when the exit
    /// status could not be collected; [`Transcoder::finish`] reports that.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(&FinishedProcess) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called on the drain thread whenever progress or ETA changes.
    #[must_use]
    pub fn on_progress(mut self, observer: impl FnMut(ProgressSnapshot) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(observer));
        self
    }

    pub fn build(self) -> CoreResult<Transcoder> {
        self.config.validate()?;
        let capture_stderr = self.config.capture_stderr;
        let own_process_group = self.config.own_process_group;
        let spawner = self.spawner.unwrap_or_else(|| {
            Arc::new(StdSpawner::new().own_process_group(own_process_group))
        });
        Ok(Transcoder {
            tool: self.tool,
            source: self.source,
            options: self.options,
            config: self.config,
            spawner,
            on_complete: Mutex::new(self.on_complete),
            on_progress: Mutex::new(self.on_progress),
            tracker: ProgressTracker::new(),
            stdout: OutputStream::new(true),
            stderr: OutputStream::new(capture_stderr),
            cancel: CancelToken::new(),
            run: Mutex::new(None),
            shared: Arc::new(Shared {
                state: Mutex::new(TranscodeState::NotStarted),
                child: Mutex::new(None),
                exit: Mutex::new(None),
                exited: Condvar::new(),
            }),
        })
    }
}

/// Supervises one run of `transcode-video` for one source file.
///
/// All methods take `&self`; a `Transcoder` can be shared across threads
/// (for example one thread waiting while another calls [`stop`](Self::stop)).
///
/// # Examples
///
/// ```rust,no_run
/// use transcoder_core::config::TranscoderConfig;
/// use transcoder_core::external::verify_tool;
/// use transcoder_core::options::TranscoderOptions;
/// use transcoder_core::process::Transcoder;
///
/// let config = TranscoderConfig::from_env();
/// let tool = verify_tool(&config)?;
/// let transcoder = Transcoder::builder(tool, "/movies/Movie.mkv")
///     .options(TranscoderOptions::default())
///     .config(config)
///     .on_complete(|finished| println!("done: {}", finished.report))
///     .build()?;
/// transcoder.start()?;
/// let report = transcoder.finish()?;
/// # Ok::<(), transcoder_core::CoreError>(())
/// ```
pub struct Transcoder {
    tool: VerifiedTool,
    source: PathBuf,
    options: TranscoderOptions,
    config: TranscoderConfig,
    spawner: Arc<dyn ProcessSpawner>,
    on_complete: Mutex<Option<CompletionCallback>>,
    on_progress: Mutex<Option<ProgressObserver>>,
    tracker: ProgressTracker,
    stdout: OutputStream,
    stderr: OutputStream,
    cancel: CancelToken,
    run: Mutex<Option<RunInfo>>,
    shared: Arc<Shared>,
}

impl fmt::Debug for Transcoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("tool", &self.tool)
            .field("source", &self.source)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Transcoder {
    /// Starts building a transcoder for `source` using a verified tool.
    #[must_use]
    pub fn builder(tool: VerifiedTool, source: impl Into<PathBuf>) -> TranscoderBuilder {
        TranscoderBuilder {
            tool,
            source: source.into(),
            options: TranscoderOptions::default(),
            config: TranscoderConfig::default(),
            spawner: None,
            on_complete: None,
            on_progress: None,
        }
    }

    /// The full argument vector: encoded options followed by the absolute source path.
    pub fn arguments(&self) -> CoreResult<Vec<String>> {
        let source = absolute_source(&self.source)?;
        let mut args = self.options.build_arguments();
        args.push(source.to_string_lossy().into_owned());
        Ok(args)
    }

    /// Spawns the tool and starts supervising it. Calling it again is a no-op.
    pub fn start(&self) -> CoreResult<()> {
        let mut state = lock(&self.shared.state);
        if *state != TranscodeState::NotStarted {
            debug!("start() ignored: transcode is already {}", *state);
            return Ok(());
        }

        let command = CommandLine::new(self.tool.program(), self.arguments()?);
        let mut child = self.spawner.spawn(&command)?;
        let pid = child.id();

        let threads = self.spawn_readers(&mut child);
        let (drain, stderr_reader) = match threads {
            Ok(threads) => threads,
            Err(e) => {
                abandon(child);
                return Err(e);
            }
        };

        *lock(&self.shared.child) = Some(child);
        *lock(&self.run) = Some(RunInfo {
            pid,
            command: command.clone(),
        });

        let mut readers = vec![("stdout drain", drain)];
        readers.extend(stderr_reader.map(|reader| ("stderr reader", reader)));
        let monitor = Monitor {
            shared: Arc::clone(&self.shared),
            poll_interval: self.config.poll_interval,
            cancel: self.cancel.clone(),
            readers,
            on_complete: lock(&self.on_complete).take(),
            pid,
            command: command.clone(),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        };
        if let Err(e) = thread::Builder::new()
            .name("transcoder-monitor".to_string())
            .spawn(move || monitor.run())
        {
            if let Some(child) = lock(&self.shared.child).take() {
                abandon(child);
            }
            return Err(e.into());
        }

        info!("Started {} (pid {})", command, pid);
        *state = TranscodeState::Running;
        Ok(())
    }

    fn spawn_readers(
        &self,
        child: &mut Child,
    ) -> CoreResult<(JoinHandle<()>, Option<JoinHandle<()>>)> {
        let stdout = child.stdout.take().ok_or(CoreError::StreamUnavailable("stdout"))?;
        let source = line_source_for(
            self.config.line_source,
            stdout,
            self.config.chunk_size,
            self.config.poll_interval,
        );

        let mut extractor = ProgressExtractor::new(self.tracker.clone());
        if let Some(observer) = lock(&self.on_progress).take() {
            extractor = extractor.with_observer(observer);
        }
        let transcript = self.stdout.clone();
        let cancel = self.cancel.clone();
        let drain = thread::Builder::new()
            .name("transcoder-drain".to_string())
            .spawn(move || {
                let result = source.drain(&cancel, &mut |line: &str| {
                    transcript.push(line);
                    extractor.observe(line);
                });
                if let Err(e) = result {
                    warn!("Reading transcode-video output failed: {e}");
                }
            })?;

        let stderr_reader = match child.stderr.take() {
            Some(pipe) => Some(self.spawn_stderr_reader(pipe)?),
            None => None,
        };
        Ok((drain, stderr_reader))
    }

    fn spawn_stderr_reader(&self, pipe: ChildStderr) -> CoreResult<JoinHandle<()>> {
        let transcript = self.stderr.clone();
        let handle = thread::Builder::new()
            .name("transcoder-stderr".to_string())
            .spawn(move || {
                let mut splitter = LineSplitter::new();
                let mut sink = |line: &str| {
                    debug!(target: "transcoder::stderr", "{line}");
                    transcript.push(line);
                };
                let result = on_output(pipe, STDERR_CHUNK_SIZE, |chunk| {
                    splitter.push(chunk, &mut sink);
                    std::ops::ControlFlow::Continue(())
                });
                splitter.finish(&mut sink);
                if let Err(e) = result {
                    debug!("stderr reader stopped: {e}");
                }
            })?;
        Ok(handle)
    }

    /// Sends SIGTERM and stops progress updates. Only valid while running.
    pub fn stop(&self) -> bool {
        self.cancel_with(ControlSignal::Terminate)
    }

    /// Sends SIGINT and stops progress updates. Only valid while running.
    pub fn interrupt(&self) -> bool {
        self.cancel_with(ControlSignal::Interrupt)
    }

    fn cancel_with(&self, request: ControlSignal) -> bool {
        let mut state = lock(&self.shared.state);
        if *state != TranscodeState::Running {
            debug!("{request:?} ignored: transcode is {}", *state);
            return false;
        }
        if !self.signal(request) {
            return false;
        }
        self.cancel.cancel();
        *state = TranscodeState::Cancelled;
        true
    }

    /// Pauses the process (SIGSTOP). Returns whether it was suspended.
    pub fn suspend(&self) -> bool {
        self.transition(
            ControlSignal::Suspend,
            TranscodeState::Running,
            TranscodeState::Suspended,
        )
    }

    /// Continues a suspended process (SIGCONT). Returns whether it was resumed.
    pub fn resume(&self) -> bool {
        self.transition(
            ControlSignal::Resume,
            TranscodeState::Suspended,
            TranscodeState::Running,
        )
    }

    fn transition(&self, request: ControlSignal, from: TranscodeState, to: TranscodeState) -> bool {
        let mut state = lock(&self.shared.state);
        if *state != from {
            debug!("{request:?} ignored: transcode is {}", *state);
            return false;
        }
        if !self.signal(request) {
            return false;
        }
        *state = to;
        true
    }

    fn signal(&self, request: ControlSignal) -> bool {
        let mut child = lock(&self.shared.child);
        let Some(child) = child.as_mut() else {
            debug!("{request:?} not sent: process already exited");
            return false;
        };
        match signal::send(child, request) {
            Ok(()) => {
                debug!("Sent {request:?} to pid {}", child.id());
                true
            }
            Err(e) => {
                warn!("Failed to send {request:?} to pid {}: {e}", child.id());
                false
            }
        }
    }

    /// Blocks until the process has terminated and its output was drained.
    ///
    /// Returns immediately if the transcode was never started.
    pub fn wait(&self) {
        if self.state() == TranscodeState::NotStarted {
            return;
        }
        let mut exit = lock(&self.shared.exit);
        while exit.is_none() {
            exit = self
                .shared
                .exited
                .wait(exit)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Waits for termination and returns how the process ended.
    ///
    /// Fails with [`CoreError::Wait`] when the exit status could not be collected.
    pub fn finish(&self) -> CoreResult<ExitReport> {
        if self.state() == TranscodeState::NotStarted {
            return Err(CoreError::NotStarted);
        }
        self.wait();
        match lock(&self.shared.exit).as_ref() {
            Some(outcome) => outcome_result(outcome),
            None => Err(CoreError::NotStarted),
        }
    }

    /// Like [`finish`](Self::finish) but gives up after `timeout`.
    ///
    /// Returns `None` while the process is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<CoreResult<ExitReport>> {
        let exit = lock(&self.shared.exit);
        let (exit, _) = self
            .shared
            .exited
            .wait_timeout_while(exit, timeout, |exit| exit.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        exit.as_ref().map(outcome_result)
    }

    #[must_use]
    pub fn state(&self) -> TranscodeState {
        *lock(&self.shared.state)
    }

    /// Whether supervision of the process has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        lock(&self.shared.exit).is_some()
    }

    /// How the process ended; `None` while running or if its status was lost.
    #[must_use]
    pub fn exit_report(&self) -> Option<ExitReport> {
        lock(&self.shared.exit)
            .as_ref()
            .and_then(|outcome| outcome.as_ref().ok().copied())
    }

    /// Progress as a fraction in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.tracker.fraction()
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.tracker.percent()
    }

    #[must_use]
    pub fn eta(&self) -> Option<Eta> {
        self.tracker.eta()
    }

    /// Progress and ETA read together.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tracker.snapshot()
    }

    /// A handle other threads can poll for progress.
    #[must_use]
    pub fn tracker(&self) -> ProgressTracker {
        self.tracker.clone()
    }

    #[must_use]
    pub fn stdout(&self) -> &OutputStream {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &OutputStream {
        &self.stderr
    }

    /// The command line used to spawn the tool, once started.
    #[must_use]
    pub fn command_line(&self) -> Option<CommandLine> {
        lock(&self.run).as_ref().map(|run| run.command.clone())
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        lock(&self.run).as_ref().map(|run| run.pid)
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    #[must_use]
    pub fn tool(&self) -> &VerifiedTool {
        &self.tool
    }
}

/// Everything the monitor thread owns for one run.
struct Monitor {
    shared: Arc<Shared>,
    poll_interval: Duration,
    cancel: CancelToken,
    readers: Vec<(&'static str, JoinHandle<()>)>,
    on_complete: Option<CompletionCallback>,
    pid: u32,
    command: CommandLine,
    stdout: OutputStream,
    stderr: OutputStream,
}

impl Monitor {
    fn run(mut self) {
        let reaped = self.reap();

        let mut deadline = None;
        for (name, reader) in std::mem::take(&mut self.readers) {
            self.join_reader(reader, name, &mut deadline);
        }

        let outcome = match reaped {
            Ok(status) => Ok(ExitReport::from_status(status)),
            Err(e) => {
                error!("Lost the exit status of pid {}: {e}", self.pid);
                Err(WaitFailure::new(&self.command, &e))
            }
        };

        {
            let mut state = lock(&self.shared.state);
            if matches!(*state, TranscodeState::Running | TranscodeState::Suspended) {
                *state = TranscodeState::Completed;
            }
            if let Ok(report) = &outcome {
                info!(
                    "transcode-video (pid {}) finished with {}; {}",
                    self.pid, report, *state
                );
            }
        }

        if let (Ok(report), Some(callback)) = (&outcome, self.on_complete.take()) {
            callback(&FinishedProcess {
                pid: self.pid,
                command: self.command.clone(),
                stdout: self.stdout.clone(),
                stderr: self.stderr.clone(),
                report: *report,
            });
        }

        *lock(&self.shared.exit) = Some(outcome);
        self.shared.exited.notify_all();
    }

    /// Polls until the child exits, then drops it while holding the child lock.
    fn reap(&self) -> io::Result<ExitStatus> {
        loop {
            {
                let mut guard = lock(&self.shared.child);
                let polled = match guard.as_mut() {
                    Some(child) => child.try_wait(),
                    None => return Err(io::Error::other("process handle already released")),
                };
                match polled {
                    Ok(Some(status)) => {
                        guard.take();
                        return Ok(status);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to poll pid {}: {e}", self.pid);
                        let child = guard.take();
                        drop(guard);
                        return match child {
                            Some(mut child) => child.wait().map_err(|_| e),
                            None => Err(e),
                        };
                    }
                }
            }
            thread::sleep(self.poll_interval);
        }
    }

    /// Joins `handle`, or detaches it once cancellation has been pending for
    /// longer than [`CANCELLED_READER_GRACE`]. The deadline is shared by all
    /// readers of the run.
    fn join_reader(&self, handle: JoinHandle<()>, name: &str, deadline: &mut Option<Instant>) {
        while !handle.is_finished() {
            if deadline.is_none() && self.cancel.is_cancelled() {
                *deadline = Some(Instant::now() + CANCELLED_READER_GRACE);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(
                    "{name} of pid {} still blocked after cancellation; detaching it",
                    self.pid
                );
                return;
            }
            thread::sleep(self.poll_interval);
        }
        if handle.join().is_err() {
            error!("{name} thread panicked");
        }
    }
}

fn absolute_source(source: &Path) -> CoreResult<PathBuf> {
    std::path::absolute(source).map_err(|e| CoreError::InvalidPath {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })
}

fn abandon(mut child: Child) {
    if let Err(e) = child.kill() {
        debug!("Failed to kill abandoned child: {e}");
    }
    let _ = child.wait();
}
