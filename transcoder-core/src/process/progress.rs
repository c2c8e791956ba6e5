//! Progress and ETA extraction from `transcode-video` output
//!
//! HandBrake prints status lines such as
//! `Encoding: task 1 of 1, 42.17 % (61.27 fps, avg 63.02 fps, ETA 00h12m34s)`.
//! The extractor pulls the percentage and the remaining time out of those
//! lines and publishes them through a shared [`ProgressTracker`].

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const PROGRESS_MARKER: &str = " %";
const ETA_MARKER: &str = "ETA ";

/// Estimated time remaining.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Eta {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Eta {
    #[must_use]
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }

    #[must_use]
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(
            u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds),
        )
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}h{:02}m{:02}s", self.hours, self.minutes, self.seconds)
    }
}

/// Progress and ETA, read together.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressSnapshot {
    /// Percent complete, in `[0, 100]`.
    pub percent: f64,
    /// `None` until the tool has reported an ETA.
    pub eta: Option<Eta>,
}

impl ProgressSnapshot {
    /// Progress as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.percent / 100.0
    }
}

/// Shared, read-only view of a job's progress.
///
/// Clones observe the same state. Only the extractor that owns the tracker
/// writes to it.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker(Arc<Mutex<ProgressSnapshot>>);

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.0.lock().map(|state| *state).unwrap_or_default()
    }

    #[must_use]
    pub fn fraction(&self) -> f64 {
        self.snapshot().fraction()
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        self.snapshot().percent
    }

    #[must_use]
    pub fn eta(&self) -> Option<Eta> {
        self.snapshot().eta
    }

    /// Applies `change` and returns the new snapshot if it reported a change.
    fn update(
        &self,
        change: impl FnOnce(&mut ProgressSnapshot) -> bool,
    ) -> Option<ProgressSnapshot> {
        let mut state = self.0.lock().ok()?;
        change(&mut *state).then_some(*state)
    }
}

/// Parses the percentage from a status line.
///
/// The last whitespace token before the first `" %"` must be a finite,
/// non-negative number. Values above 100 are clamped.
#[must_use]
pub fn parse_progress(line: &str) -> Option<f64> {
    let marker = line.find(PROGRESS_MARKER)?;
    let value: f64 = line[..marker].split_whitespace().next_back()?.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.min(100.0))
}

/// Parses `<h>h<m>m<s>s` following the last `"ETA "` in a status line.
#[must_use]
pub fn parse_eta(line: &str) -> Option<Eta> {
    let marker = line.rfind(ETA_MARKER)?;
    let token = line[marker + ETA_MARKER.len()..].split_whitespace().next()?;
    let (hours, rest) = split_component(token, 'h')?;
    let (minutes, rest) = split_component(rest, 'm')?;
    let (seconds, _) = split_component(rest, 's')?;
    Some(Eta::new(hours, minutes, seconds))
}

fn split_component(text: &str, unit: char) -> Option<(u32, &str)> {
    let (digits, rest) = text.split_once(unit)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, rest))
}

/// Remembers the last value seen and reports whether a new one differs.
#[derive(Debug, Clone, Default)]
pub struct LatchedLine {
    current: Option<String>,
}

impl LatchedLine {
    /// Stores `line`; returns `true` if it differs from the previous value.
    pub fn set(&mut self, line: &str) -> bool {
        if self.current.as_deref() == Some(line) {
            return false;
        }
        self.current = Some(line.to_string());
        true
    }

    #[must_use]
    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

type UpdateObserver = Box<dyn FnMut(ProgressSnapshot) + Send>;

/// Turns output lines into progress and ETA updates.
pub struct ProgressExtractor {
    tracker: ProgressTracker,
    progress_line: LatchedLine,
    eta_line: LatchedLine,
    on_update: Option<UpdateObserver>,
}

impl fmt::Debug for ProgressExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressExtractor")
            .field("tracker", &self.tracker)
            .field("progress_line", &self.progress_line)
            .field("eta_line", &self.eta_line)
            .finish_non_exhaustive()
    }
}

impl ProgressExtractor {
    #[must_use]
    pub fn new(tracker: ProgressTracker) -> Self {
        Self {
            tracker,
            progress_line: LatchedLine::default(),
            eta_line: LatchedLine::default(),
            on_update: None,
        }
    }

    /// Registers an observer called whenever progress or ETA actually changes.
    #[must_use]
    pub fn with_observer(
        mut self,
        observer: impl FnMut(ProgressSnapshot) + Send + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// The last line that carried a progress marker.
    #[must_use]
    pub fn last_progress_line(&self) -> Option<&str> {
        self.progress_line.get()
    }

    /// The last line that carried an ETA marker.
    #[must_use]
    pub fn last_eta_line(&self) -> Option<&str> {
        self.eta_line.get()
    }

    /// Feeds one output line. Lines without markers are ignored.
    pub fn observe(&mut self, line: &str) {
        let mut updated = None;

        if line.contains(PROGRESS_MARKER) && self.progress_line.set(line) {
            updated = self.apply_progress(line).or(updated);
        }
        if line.contains(ETA_MARKER) && self.eta_line.set(line) {
            updated = self.apply_eta(line).or(updated);
        }

        if let (Some(snapshot), Some(observer)) = (updated, self.on_update.as_mut()) {
            observer(snapshot);
        }
    }

    fn apply_progress(&self, line: &str) -> Option<ProgressSnapshot> {
        let Some(percent) = parse_progress(line) else {
            log::trace!(target: "transcoder::progress", "Ignoring malformed progress line: {line}");
            return None;
        };
        self.tracker.update(|state| {
            if percent > state.percent {
                state.percent = percent;
                true
            } else {
                false
            }
        })
    }

    fn apply_eta(&self, line: &str) -> Option<ProgressSnapshot> {
        let Some(eta) = parse_eta(line) else {
            log::trace!(target: "transcoder::progress", "Ignoring malformed ETA line: {line}");
            return None;
        };
        self.tracker.update(|state| {
            let changed = state.eta != Some(eta);
            state.eta = Some(eta);
            changed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ProgressExtractor {
        ProgressExtractor::new(ProgressTracker::new())
    }

    #[test]
    fn test_handbrake_status_line() {
        let mut extractor = extractor();
        extractor.observe(
            "Encoding: task 1 of 1, 42.17 % (61.27 fps, avg 63.02 fps, ETA 00h12m34s)",
        );
        let snapshot = extractor.tracker().snapshot();
        assert_eq!(snapshot.percent, 42.17);
        assert_eq!(snapshot.eta, Some(Eta::new(0, 12, 34)));
        assert!((snapshot.fraction() - 0.4217).abs() < 1e-9);
    }

    #[test]
    fn test_comma_separated_status_line() {
        let mut extractor = extractor();
        extractor.observe("Encoding: task 1 of 1, 42.50 %, 24 fps, ETA 01h02m03s");
        let snapshot = extractor.tracker().snapshot();
        assert!((snapshot.fraction() - 0.425).abs() < 1e-9);
        assert_eq!(snapshot.eta, Some(Eta::new(1, 2, 3)));
    }

    #[test]
    fn test_regression_between_increases_is_dropped() {
        let mut extractor = extractor();
        for line in ["Encoding: 50.0 %", "Encoding: 30.0 %", "Encoding: 70.0 %"] {
            extractor.observe(line);
        }
        assert_eq!(extractor.tracker().percent(), 70.0);
    }

    #[test]
    fn test_eta_missing_minutes_separator_is_ignored() {
        assert_eq!(parse_eta("ETA 01h0203s"), None);
        let mut extractor = extractor();
        extractor.observe("Encoding: 10.00 %, ETA 00h30m00s");
        extractor.observe("Encoding: 11.00 %, ETA 01h0203s");
        assert_eq!(extractor.tracker().eta(), Some(Eta::new(0, 30, 0)));
        assert_eq!(extractor.tracker().percent(), 11.0);
    }

    #[test]
    fn test_eta_absent_until_reported() {
        let mut extractor = extractor();
        extractor.observe("Encoding: task 1 of 1, 0.50 %");
        assert_eq!(extractor.tracker().eta(), None);
        assert_eq!(extractor.tracker().percent(), 0.5);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut extractor = extractor();
        extractor.observe("Encoding: 50.00 %");
        extractor.observe("Encoding: 10.00 %");
        assert_eq!(extractor.tracker().percent(), 50.0);
        extractor.observe("Encoding: 50.01 %");
        assert_eq!(extractor.tracker().percent(), 50.01);
    }

    #[test]
    fn test_malformed_progress_is_ignored() {
        let mut extractor = extractor();
        extractor.observe("Encoding: 12.00 %");
        let malformed = [
            "Encoding: abc %",
            "Encoding: NaN %",
            "Encoding: inf %",
            "Encoding: -5 %",
            " %",
        ];
        for line in malformed {
            extractor.observe(line);
        }
        assert_eq!(extractor.tracker().percent(), 12.0);
    }

    #[test]
    fn test_progress_above_hundred_is_clamped() {
        assert_eq!(parse_progress("Muxing: 150 %"), Some(100.0));
        let mut extractor = extractor();
        extractor.observe("Muxing: 150 %");
        assert_eq!(extractor.tracker().fraction(), 1.0);
    }

    #[test]
    fn test_first_marker_decides() {
        assert_eq!(parse_progress("task 1 of 2, 10.00 % then 90.00 %"), Some(10.0));
    }

    #[test]
    fn test_eta_uses_last_marker_and_latest_wins() {
        assert_eq!(
            parse_eta("old ETA 01h00m00s, new ETA 00h05m07s)"),
            Some(Eta::new(0, 5, 7))
        );
        let mut extractor = extractor();
        extractor.observe("ETA 00h10m00s");
        extractor.observe("ETA 00h20m00s");
        assert_eq!(extractor.tracker().eta(), Some(Eta::new(0, 20, 0)));
    }

    #[test]
    fn test_malformed_eta_retains_previous() {
        let mut extractor = extractor();
        extractor.observe("ETA 00h01m02s");
        for line in ["ETA soon", "ETA 1h2m", "ETA h01m02s", "ETA +1h02m03s", "ETA "] {
            extractor.observe(line);
        }
        assert_eq!(extractor.tracker().eta(), Some(Eta::new(0, 1, 2)));
    }

    #[test]
    fn test_observer_only_sees_real_changes() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut extractor = extractor().with_observer(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        extractor.observe("Encoding: 10.00 %");
        extractor.observe("Encoding: 10.00 %");
        extractor.observe("Encoding: 5.00 %");
        extractor.observe("Encoding: 20.00 % (ETA 00h00m10s)");
        extractor.observe("no markers here");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(extractor.last_progress_line(), Some("Encoding: 20.00 % (ETA 00h00m10s)"));
    }

    #[test]
    fn test_latch_reports_changes() {
        let mut latch = LatchedLine::default();
        assert!(latch.set("a"));
        assert!(!latch.set("a"));
        assert!(latch.set("b"));
        assert_eq!(latch.get(), Some("b"));
    }

    #[test]
    fn test_eta_display() {
        assert_eq!(Eta::new(1, 2, 3).to_string(), "01h02m03s");
        assert_eq!(Eta::new(1, 2, 3).as_duration(), Duration::from_secs(3723));
    }
}
