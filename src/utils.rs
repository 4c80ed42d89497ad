//! Formatting helpers for the run summary

use std::time::Duration;

/// Format a duration as "2 min 5 sec" or "4.2 sec"
#[inline]
pub fn format_duration(dur: Duration) -> String {
    let secs = dur.as_secs();
    if secs >= 60 {
        format!("{} min {} sec", secs / 60, secs % 60)
    } else {
        format!("{:.1} sec", dur.as_secs_f64())
    }
}

/// Share of `part` in `whole` as a percentage; 0 when `whole` is 0
#[inline]
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
