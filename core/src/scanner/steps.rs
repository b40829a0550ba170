//! Step accounting for a simulated scan.

use kalium_common::models::scan::{ScanKind, ScanParams};

/// Default depth when a full scan somehow lacks one.
const DEFAULT_FULL_DEPTH: i64 = 3;

/// Number of steps the progress percentage is computed against.
///
/// Narrated findings can push the real event count past this value.
pub fn total_steps(kind: ScanKind, params: &ScanParams) -> u32 {
    match kind {
        ScanKind::Quick => match params.text("intensity") {
            Some("high") => 10,
            _ => 8,
        },
        ScanKind::Full => {
            let depth = params.number("depth").unwrap_or(DEFAULT_FULL_DEPTH).max(0);
            u32::try_from(depth * 3 + 6).unwrap_or(u32::MAX)
        }
        ScanKind::Ports => match params.text("portRange") {
            Some("full") => 20,
            Some("extended") => 15,
            _ => 10,
        },
        ScanKind::Web => match params.text("scanTypes") {
            Some("all") => 18,
            _ => 12,
        },
        ScanKind::Malware => match params.text("engineType") {
            Some("deep") => 15,
            _ => 8,
        },
    }
}

/// `round(step / total * 100)`, saturating at 100.
pub fn percent(step: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (f64::from(step) / f64::from(total) * 100.0).round();
    pct.min(100.0) as u8
}

/// Highest percentage reported before the terminal event.
pub const MAX_INTERMEDIATE: u8 = 99;

/// Counts emitted steps and derives the reported percentage.
#[derive(Debug)]
pub struct StepCounter {
    current: u32,
    total: u32,
}

impl StepCounter {
    pub fn new(total: u32) -> Self {
        Self { current: 0, total }
    }

    /// Advances one step and returns the intermediate percentage.
    pub fn advance(&mut self) -> u8 {
        self.current += 1;
        percent(self.current, self.total).min(MAX_INTERMEDIATE)
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}
