//! Display formatting helpers
//!
//! Shared by every surface that renders playback time or clip size, so the
//! result card and the player controls can never drift apart.

use std::time::Duration;

/// Format a playback position as `m:ss`, truncated to whole seconds.
///
/// Minutes are not padded; seconds always are. `125.7s` renders as `2:05`.
pub fn clock(position: Duration) -> String {
    let total = position.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format an optional duration, rendering unknown as `-:--`.
///
/// A clip whose length has not been determined must not render as `0:00`,
/// which would be indistinguishable from an actually zero-length clip.
pub fn clock_opt(position: Option<Duration>) -> String {
    match position {
        Some(d) => clock(d),
        None => "-:--".to_string(),
    }
}

/// Format a byte count in megabytes with two decimals (e.g. "2.40 MB")
pub fn megabytes(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_truncates_fractional_seconds() {
        assert_eq!(clock(Duration::from_secs_f64(125.7)), "2:05");
        assert_eq!(clock(Duration::from_secs_f64(59.999)), "0:59");
    }

    #[test]
    fn clock_pads_seconds_not_minutes() {
        assert_eq!(clock(Duration::from_secs(5)), "0:05");
        assert_eq!(clock(Duration::from_secs(60)), "1:00");
        assert_eq!(clock(Duration::from_secs(61)), "1:01");
        assert_eq!(clock(Duration::from_secs(600)), "10:00");
    }

    #[test]
    fn clock_zero() {
        assert_eq!(clock(Duration::ZERO), "0:00");
    }

    #[test]
    fn clock_over_an_hour_keeps_minutes() {
        assert_eq!(clock(Duration::from_secs(3661)), "61:01");
    }

    #[test]
    fn unknown_duration_is_not_zero() {
        assert_eq!(clock_opt(None), "-:--");
        assert_ne!(clock_opt(None), clock_opt(Some(Duration::ZERO)));
    }

    #[test]
    fn known_duration_renders_as_clock() {
        assert_eq!(clock_opt(Some(Duration::from_secs(95))), "1:35");
    }

    #[test]
    fn megabytes_two_decimals() {
        assert_eq!(megabytes(2_516_582), "2.40 MB");
        assert_eq!(megabytes(0), "0.00 MB");
        assert_eq!(megabytes(1024 * 1024), "1.00 MB");
    }

    #[test]
    fn megabytes_small_files_round_down() {
        assert_eq!(megabytes(1024), "0.00 MB");
        assert_eq!(megabytes(52_429), "0.05 MB");
    }
}
