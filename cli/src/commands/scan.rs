use std::sync::Arc;
use std::time::Instant;

use colored::*;
use kalium_common::config::Config;
use kalium_common::models::progress::ScanState;
use kalium_common::models::scan::{ScanKind, parse_assignment};
use kalium_core::dashboard::Dashboard;
use kalium_core::scanner::ScanSimulator;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, warn};

use crate::commands::{cancel_on_interrupt, data_client};
use crate::kprint;
use crate::terminal::{colors, format, print, progress::ScanBar};

#[derive(Default)]
struct Tally {
    services: usize,
    vulnerabilities: usize,
    failures: usize,
}

pub async fn scan(
    kind: ScanKind,
    target: String,
    set: &[String],
    cfg: &Arc<Config>,
    proxy_url: Option<&str>,
) -> anyhow::Result<()> {
    let mut assignments = vec![("target".to_string(), target)];
    for raw in set {
        assignments.push(parse_assignment(raw)?);
    }

    let params = kind.config().resolve(assignments)?;
    if cfg.quiet == 0 {
        let width = params.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
        for (key, value) in params.iter() {
            print::aligned_line(key, width, value.to_string());
        }
        kprint!();
    }

    let client = data_client(cfg, proxy_url);
    let simulator = ScanSimulator::new(client.clone()).with_step_delay(cfg.step_delay);
    let cancel = CancellationToken::new();
    cancel_on_interrupt(cancel.clone());

    let bar = ScanBar::new()?;
    let mut tally = Tally::default();
    let start = Instant::now();

    let report = simulator
        .run(kind, &params, &cancel, |event| {
            bar.update(&event);
            match event.status.as_str() {
                "Service detection" => tally.services += 1,
                "Vulnerability detected" => tally.vulnerabilities += 1,
                s if s.ends_with("failed") => tally.failures += 1,
                _ => {}
            }
            if cfg.quiet < 2 {
                print::print(&format::progress_line(&event));
            }
        })
        .instrument(bar.span().clone())
        .await?;
    drop(bar);
    cancel.cancel();

    if report.state == ScanState::Cancelled {
        warn!(events = report.events, "Scan cancelled before completion");
        return Ok(());
    }

    print_summary(&tally, start.elapsed().as_secs_f64(), cfg.quiet);

    // Stat cards after the run, as the dashboard would show them.
    let dash = Dashboard::new(client);
    dash.refresh().await;
    if cfg.quiet < 2 {
        print::aligned_line("Stats", 5, format::stats_line(&dash.latest()));
    }
    Ok(())
}

fn print_summary(tally: &Tally, secs: f64, q_level: u8) {
    let services = format!("{} services", tally.services).bold().green();
    let vulns = format!("{} vulnerabilities", tally.vulnerabilities).bold();
    let vulns = if tally.vulnerabilities > 0 {
        vulns.color(colors::DANGER)
    } else {
        vulns.color(colors::SUCCESS)
    };
    let elapsed = format!("{secs:.2}s").bold().yellow();
    let output = format!("Scan Complete: {services}, {vulns} in {elapsed}");

    if tally.failures > 0 {
        warn!(failures = tally.failures, "Some lookups failed, findings may be incomplete");
    }

    match q_level {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            kprint!();
            print::print(&output);
        }
    }
}
