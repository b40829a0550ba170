//! Wall-clock labels used as chart timestamps.

use chrono::{DateTime, Local, TimeDelta};

/// Format used by every `timestamp` field the dashboard renders.
pub const LABEL_FORMAT: &str = "%H:%M";

pub fn label(at: DateTime<Local>) -> String {
    at.format(LABEL_FORMAT).to_string()
}

/// Label for the current local time.
pub fn now_label() -> String {
    label(Local::now())
}

/// Returns `count` labels walking backwards from `start`, one every `step`.
///
/// The first label is `start` itself.
pub fn trailing_labels(start: DateTime<Local>, count: usize, step: TimeDelta) -> Vec<String> {
    (0..count)
        .map(|i| label(start - step * i as i32))
        .collect()
}
