//! Small formatting helpers shared by the library and the CLI.

use std::time::Duration;

use crate::process::Eta;

/// `3725.0` becomes `"01:02:05"`; negative or non-finite input becomes `"??:??:??"`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds.is_sign_negative() {
        return "??:??:??".to_string();
    }
    let whole = seconds.trunc() as u64;
    format!("{:02}:{:02}:{:02}", whole / 3600, whole / 60 % 60, whole % 60)
}

/// Formats an optional ETA as HH:MM:SS, or "--:--:--" before the tool reported one.
#[must_use]
pub fn format_eta(eta: Option<Eta>) -> String {
    match eta {
        Some(eta) => format_duration(eta.as_duration().as_secs_f64()),
        None => "--:--:--".to_string(),
    }
}

/// Formats an elapsed wall-clock time as HH:MM:SS.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format_duration(elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3725.0), "01:02:05");
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(None), "--:--:--");
        assert_eq!(format_eta(Some(Eta::new(2, 0, 9))), "02:00:09");
    }
}
