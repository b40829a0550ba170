use std::sync::Arc;

use colored::*;
use kalium_common::config::Config;
use kalium_core::dashboard::{Dashboard, DashboardSnapshot};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info};

use crate::commands::{cancel_on_interrupt, data_client};
use crate::kprint;
use crate::terminal::{colors, format, print, progress};

const CARD_KEY_WIDTH: usize = 15;

pub async fn dashboard(watch: bool, cfg: &Arc<Config>, proxy_url: Option<&str>) -> anyhow::Result<()> {
    let dash = Arc::new(Dashboard::new(data_client(cfg, proxy_url)));

    if !watch {
        let spinner = progress::spinner("Fetching dashboard feeds...")?;
        dash.refresh().instrument(spinner).await;
        print_snapshot(&dash.latest(), cfg.quiet);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    cancel_on_interrupt(shutdown.clone());

    let mut rx = dash.subscribe();
    let poller = dash.clone().spawn_poller(cfg.poll_interval, shutdown.clone());

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                print_snapshot(&snapshot, cfg.quiet);
                info!(
                    next_in_secs = cfg.poll_interval.as_secs(),
                    "Waiting for next refresh, Ctrl+C to stop"
                );
            }
            _ = shutdown.cancelled() => break,
        }
    }

    poller.await?;
    Ok(())
}

fn print_snapshot(snapshot: &DashboardSnapshot, q_level: u8) {
    let refreshed = snapshot
        .refreshed_at
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    if q_level > 0 {
        print::print(&format!("{refreshed} {}", format::stats_line(snapshot)));
        return;
    }

    kprint!();
    print::tree_head(snapshot.generation as usize, &format!("Snapshot at {refreshed}"));
    print::aligned_line("Recent scans", CARD_KEY_WIDTH, format::thousands(snapshot.scans).color(colors::ACCENT));
    print::aligned_line("Data sources", CARD_KEY_WIDTH, snapshot.sources.to_string().color(colors::ACCENT));
    print::aligned_line(
        "Threats",
        CARD_KEY_WIDTH,
        format::thousands(snapshot.total_threats()).color(colors::DANGER),
    );

    let values: Vec<f64> = snapshot.activity.iter().map(|a| a.value).collect();
    let first = snapshot.activity.first().map(|a| a.timestamp.as_str()).unwrap_or("--:--");
    let last = snapshot.activity.last().map(|a| a.timestamp.as_str()).unwrap_or("--:--");
    print::aligned_line(
        "System activity",
        CARD_KEY_WIDTH,
        format!("{first} {} {last}", format::sparkline(&values).color(colors::PRIMARY)),
    );

    let flagged: Vec<(String, ColoredString)> = snapshot
        .threats
        .iter()
        .filter(|t| t.malicious == Some(true))
        .map(|t| {
            let domain = t.domain.clone().unwrap_or_else(|| t.timestamp.clone());
            let score = t.score.map_or_else(|| "n/a".to_string(), |s| format!("{s}"));
            (domain, format!("score {score}").color(colors::DANGER))
        })
        .collect();
    if !flagged.is_empty() {
        print::print_status("Flagged domains");
        print::branches(&flagged);
    }
}
