use indicatif::ProgressStyle;
use kalium_common::models::progress::ScanProgress;
use tracing::{Span, info_span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

pub const TIP: &str = "Press Ctrl+C to stop the scan";

fn spinner_style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template("{spinner:.blue} {wide_msg}")?.tick_strings(TICK_STRINGS))
}

fn bar_style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template(
        "{spinner:.blue} [{bar:30.green/bright_black}] {pos:>3}% {wide_msg}",
    )?
    .progress_chars("━╸ ")
    .tick_strings(TICK_STRINGS))
}

/// A spinner that lives as long as the returned span.
pub fn spinner(message: &str) -> anyhow::Result<Span> {
    let span = info_span!("spinner", indicatif.pb_show = true);
    span.pb_set_style(&spinner_style()?);
    span.pb_set_message(message);
    Ok(span)
}

/// Percentage bar driven by scan progress events.
pub struct ScanBar {
    span: Span,
}

impl ScanBar {
    pub fn new() -> anyhow::Result<Self> {
        let span = info_span!("scan", indicatif.pb_show = true);
        span.pb_set_style(&bar_style()?);
        span.pb_set_length(100);
        span.pb_set_message(TIP);
        Ok(Self { span })
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn update(&self, event: &ScanProgress) {
        self.span.pb_set_position(u64::from(event.progress));
        self.span.pb_set_message(&event.status);
    }
}
