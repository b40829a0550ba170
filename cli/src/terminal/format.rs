use colored::*;
use kalium_common::models::progress::ScanProgress;
use kalium_core::dashboard::DashboardSnapshot;

use crate::terminal::colors;

const SPARK_LEVELS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn status_color(status: &str) -> Color {
    match status {
        "Scan completed" => colors::SUCCESS,
        "Vulnerability detected" => colors::DANGER,
        "Security verdict" | "Security statistics" => colors::WARNING,
        s if s.ends_with("failed") => colors::DANGER,
        s if s.ends_with("...") => colors::PRIMARY,
        _ => colors::TEXT_DEFAULT,
    }
}

/// `[ 38%] Status: details`
pub fn progress_line(event: &ScanProgress) -> String {
    let pct = format!("[{:>3}%]", event.progress).color(colors::MUTED);
    let status = event.status.color(status_color(&event.status));
    match &event.details {
        Some(details) => format!("{pct} {status}{} {details}", ":".color(colors::SEPARATOR)),
        None => format!("{pct} {status}"),
    }
}

/// `scans=640 sources=3 threats=10`
pub fn stats_line(snapshot: &DashboardSnapshot) -> String {
    format!(
        "scans={} sources={} threats={}",
        snapshot.scans,
        snapshot.sources,
        snapshot.total_threats()
    )
}

/// Groups digits in threes: `12345` → `12,345`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One block character per value, scaled between the series min and max.
pub fn sparkline(values: &[f64]) -> String {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let top = SPARK_LEVELS.len() - 1;

    values
        .iter()
        .map(|v| {
            if !v.is_finite() || !span.is_finite() {
                return SPARK_LEVELS[0];
            }
            if span == 0.0 {
                return SPARK_LEVELS[top / 2];
            }
            let level = ((v - min) / span * top as f64).round() as usize;
            SPARK_LEVELS[level.min(top)]
        })
        .collect()
}
