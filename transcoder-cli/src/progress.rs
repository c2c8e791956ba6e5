// ============================================================================
// transcoder-cli/src/progress.rs
// ============================================================================
//
// PROGRESS DISPLAY: an indicatif bar fed by the supervisor's progress observer

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use transcoder_core::{ProgressSnapshot, format_eta};

/// Bar resolution: tenths of a percent.
const BAR_LENGTH: u64 = 1000;

/// Progress bar for one transcode.
#[derive(Clone)]
pub struct TranscodeProgress {
    bar: ProgressBar,
}

impl TranscodeProgress {
    pub fn new(file_name: &str) -> Self {
        let bar = ProgressBar::new(BAR_LENGTH);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  Encoding: {msg:>6} [{bar:30}] ({elapsed_precise}) ETA {prefix}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##."),
        );
        bar.set_message("0.0%");
        bar.set_prefix(format_eta(None));
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.println(format!("Transcoding {file_name}"));
        Self { bar }
    }

    /// A bar that draws nothing, for when stderr is not a terminal.
    pub fn hidden() -> Self {
        let bar = ProgressBar::with_draw_target(Some(BAR_LENGTH), ProgressDrawTarget::hidden());
        Self { bar }
    }

    pub fn update(&self, snapshot: ProgressSnapshot) {
        self.bar.set_position(position(snapshot));
        self.bar.set_message(format!("{:.1}%", snapshot.percent));
        self.bar.set_prefix(format_eta(snapshot.eta));
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

fn position(snapshot: ProgressSnapshot) -> u64 {
    (snapshot.fraction() * BAR_LENGTH as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use transcoder_core::Eta;

    #[test]
    fn test_position_scales_percent() {
        let snapshot = ProgressSnapshot {
            percent: 45.67,
            eta: Some(Eta::new(0, 5, 0)),
        };
        assert_eq!(position(snapshot), 457);
        assert_eq!(position(ProgressSnapshot::default()), 0);
    }

    #[test]
    fn test_hidden_bar_accepts_updates() {
        let progress = TranscodeProgress::hidden();
        progress.update(ProgressSnapshot {
            percent: 100.0,
            eta: None,
        });
        progress.finish();
    }
}
