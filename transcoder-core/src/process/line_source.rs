//! Line delivery from the tool's stdout.
//!
//! Two delivery styles exist: a push pump that blocks in `read` and hands each
//! chunk to a callback, and a poll loop that asks a reader thread for whatever
//! has arrived and checks for cancellation between reads. Both reduce to the
//! [`LineSource`] trait so the supervisor does not care which one runs.

use std::fmt;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Shared cancellation flag for a drain.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Reassembles lines from arbitrary byte chunks.
///
/// `\n` and `\r` both end a line (HandBrake redraws its status line with
/// carriage returns). Empty lines are dropped. Bytes are buffered until a
/// terminator arrives, so multi-byte characters split across chunks survive.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk, calling `sink` for every completed line.
    pub fn push(&mut self, chunk: &[u8], sink: &mut dyn FnMut(&str)) {
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                self.emit(sink);
            } else {
                self.pending.push(byte);
            }
        }
    }

    /// Emits the trailing partial line, if any.
    pub fn finish(&mut self, sink: &mut dyn FnMut(&str)) {
        self.emit(sink);
    }

    fn emit(&mut self, sink: &mut dyn FnMut(&str)) {
        if self.pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        sink(&line);
    }
}

/// Blocking chunk pump: reads until end of stream, or until `callback` breaks.
pub fn on_output<R, F>(mut reader: R, chunk_size: usize, mut callback: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(&[u8]) -> ControlFlow<()>,
{
    let mut buf = vec![0_u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if callback(&buf[..n]).is_break() {
            return Ok(());
        }
    }
}

/// A stream of text lines that can be drained into a sink.
pub trait LineSource: Send {
    /// Delivers complete lines to `sink` in arrival order until end of
    /// stream or until `cancel` is set.
    fn drain(self: Box<Self>, cancel: &CancelToken, sink: &mut dyn FnMut(&str)) -> io::Result<()>;
}

/// Line source over the blocking [`on_output`] pump.
///
/// Cancellation is noticed when the next chunk arrives or the stream ends.
pub struct PushLineSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read + Send> PushLineSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self { reader, chunk_size }
    }
}

impl<R: Read + Send> LineSource for PushLineSource<R> {
    fn drain(self: Box<Self>, cancel: &CancelToken, sink: &mut dyn FnMut(&str)) -> io::Result<()> {
        let PushLineSource { reader, chunk_size } = *self;
        let mut splitter = LineSplitter::new();
        on_output(reader, chunk_size, |chunk| {
            if cancel.is_cancelled() {
                return ControlFlow::Break(());
            }
            splitter.push(chunk, &mut *sink);
            ControlFlow::Continue(())
        })?;
        if !cancel.is_cancelled() {
            splitter.finish(sink);
        }
        Ok(())
    }
}

/// Line source that polls a reader thread for available data.
///
/// The drain loop wakes at least every `poll_interval` to check for
/// cancellation, so it returns promptly even when the stream stays silent.
pub struct PollLineSource<R> {
    reader: R,
    chunk_size: usize,
    poll_interval: Duration,
}

impl<R: Read + Send + 'static> PollLineSource<R> {
    pub fn new(reader: R, chunk_size: usize, poll_interval: Duration) -> Self {
        Self {
            reader,
            chunk_size,
            poll_interval,
        }
    }
}

impl<R: Read + Send + 'static> LineSource for PollLineSource<R> {
    fn drain(self: Box<Self>, cancel: &CancelToken, sink: &mut dyn FnMut(&str)) -> io::Result<()> {
        let PollLineSource {
            reader,
            chunk_size,
            poll_interval,
        } = *self;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        // Never joined; the reader may stay blocked in `read` after cancellation.
        thread::Builder::new()
            .name("transcoder-stdout".to_string())
            .spawn(move || {
                let result = on_output(reader, chunk_size, |chunk| match tx.send(chunk.to_vec()) {
                    Ok(()) => ControlFlow::Continue(()),
                    Err(_) => ControlFlow::Break(()),
                });
                if let Err(e) = result {
                    log::debug!("stdout reader stopped: {e}");
                }
            })?;

        let mut splitter = LineSplitter::new();
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            match rx.recv_timeout(poll_interval) {
                Ok(chunk) => {
                    splitter.push(&chunk, sink);
                    for chunk in rx.try_iter() {
                        splitter.push(&chunk, sink);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        splitter.finish(sink);
        Ok(())
    }
}

/// Which line delivery style to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineSourceKind {
    Push,
    Poll,
}

impl LineSourceKind {
    /// Push on macOS, poll elsewhere.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            LineSourceKind::Push
        } else {
            LineSourceKind::Poll
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LineSourceKind::Push => "push",
            LineSourceKind::Poll => "poll",
        }
    }
}

impl Default for LineSourceKind {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl fmt::Display for LineSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "push" => Ok(LineSourceKind::Push),
            "poll" => Ok(LineSourceKind::Poll),
            other => Err(format!("unknown line source '{other}' (expected push or poll)")),
        }
    }
}

/// Wraps `reader` in the line source selected by `kind`.
pub fn line_source_for<R>(
    kind: LineSourceKind,
    reader: R,
    chunk_size: usize,
    poll_interval: Duration,
) -> Box<dyn LineSource>
where
    R: Read + Send + 'static,
{
    match kind {
        LineSourceKind::Push => Box::new(PushLineSource::new(reader, chunk_size)),
        LineSourceKind::Poll => Box::new(PollLineSource::new(reader, chunk_size, poll_interval)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc::{Receiver, Sender};
    use std::time::Instant;

    fn collect(chunks: &[&[u8]]) -> Vec<String> {
        let mut splitter = LineSplitter::new();
        let mut lines = Vec::new();
        let mut sink = |line: &str| lines.push(line.to_string());
        for chunk in chunks {
            splitter.push(chunk, &mut sink);
        }
        splitter.finish(&mut sink);
        lines
    }

    #[test]
    fn test_splitter_reassembles_across_chunks() {
        let lines = collect(&[b"Encod", b"ing: 1.00 %\nEncoding: 2", b".00 %\n"]);
        assert_eq!(lines, vec!["Encoding: 1.00 %", "Encoding: 2.00 %"]);
    }

    #[test]
    fn test_splitter_treats_carriage_return_as_terminator() {
        let lines = collect(&[b"a 1.00 %\ra 2.00 %\r\nfinal"]);
        assert_eq!(lines, vec!["a 1.00 %", "a 2.00 %", "final"]);
    }

    #[test]
    fn test_splitter_keeps_split_multibyte_characters() {
        let text = "caf\u{e9}\n".as_bytes();
        let lines = collect(&[&text[..4], &text[4..]]);
        assert_eq!(lines, vec!["caf\u{e9}"]);
    }

    #[test]
    fn test_push_source_delivers_lines_in_order() {
        let source = Box::new(PushLineSource::new(Cursor::new(b"one\ntwo\nthree".to_vec()), 3));
        let mut lines = Vec::new();
        source
            .drain(&CancelToken::new(), &mut |line: &str| lines.push(line.to_string()))
            .unwrap();
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_poll_source_delivers_lines_then_ends() {
        let source = line_source_for(
            LineSourceKind::Poll,
            Cursor::new(b"x 10.00 %\ny 20.00 %\n".to_vec()),
            4,
            Duration::from_millis(10),
        );
        let mut lines = Vec::new();
        source
            .drain(&CancelToken::new(), &mut |line: &str| lines.push(line.to_string()))
            .unwrap();
        assert_eq!(lines, vec!["x 10.00 %", "y 20.00 %"]);
    }

    /// Reader that only returns data sent over a channel and otherwise blocks.
    struct BlockingReader(Receiver<Vec<u8>>);

    impl Read for BlockingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(bytes) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    Ok(n)
                }
                Err(_) => Ok(0),
            }
        }
    }

    #[test]
    fn test_poll_drain_returns_promptly_after_cancel_on_silent_stream() {
        let (feed, rx): (Sender<Vec<u8>>, _) = mpsc::channel();
        let source = Box::new(PollLineSource::new(
            BlockingReader(rx),
            64,
            Duration::from_millis(20),
        ));
        let cancel = CancelToken::new();
        let canceller = cancel.clone();

        feed.send(b"first line\n".to_vec()).unwrap();
        let handle = thread::spawn(move || {
            let mut lines = Vec::new();
            source
                .drain(&cancel, &mut |line: &str| lines.push(line.to_string()))
                .unwrap();
            lines
        });

        thread::sleep(Duration::from_millis(100));
        let cancelled_at = Instant::now();
        canceller.cancel();
        let lines = handle.join().unwrap();

        assert!(cancelled_at.elapsed() < Duration::from_secs(1));
        assert_eq!(lines, vec!["first line"]);
        drop(feed);
    }

    #[test]
    fn test_line_source_kind_parsing() {
        assert_eq!("Poll".parse::<LineSourceKind>(), Ok(LineSourceKind::Poll));
        assert_eq!("push".parse::<LineSourceKind>(), Ok(LineSourceKind::Push));
        assert!("stream".parse::<LineSourceKind>().is_err());
    }
}
