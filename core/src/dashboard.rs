//! # Dashboard
//!
//! Periodic snapshot of the four stat feeds.
//!
//! Each refresh takes a generation number before it starts fetching. A
//! snapshot is only published if its generation is newer than the one
//! already on the channel, so a slow refresh finishing after a faster later
//! one cannot overwrite fresher data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local};
use kalium_common::models::activity::SystemActivity;
use kalium_common::models::threat::{self, ThreatData};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::DataFetchClient;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardSnapshot {
    /// 0 until the first refresh lands.
    pub generation: u64,
    pub refreshed_at: Option<DateTime<Local>>,
    pub scans: u64,
    pub sources: usize,
    pub activity: Vec<SystemActivity>,
    pub threats: Vec<ThreatData>,
}

impl DashboardSnapshot {
    pub fn total_threats(&self) -> u64 {
        threat::total_count(&self.threats)
    }
}

pub struct Dashboard {
    client: Arc<DataFetchClient>,
    generation: AtomicU64,
    tx: watch::Sender<DashboardSnapshot>,
}

impl Dashboard {
    pub fn new(client: Arc<DataFetchClient>) -> Self {
        let (tx, _) = watch::channel(DashboardSnapshot::default());
        Self {
            client,
            generation: AtomicU64::new(0),
            tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> DashboardSnapshot {
        self.tx.borrow().clone()
    }

    /// Fetches all four feeds concurrently and publishes the result.
    ///
    /// Returns `false` if a newer snapshot was published while this one was
    /// in flight.
    pub async fn refresh(&self) -> bool {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let (scans, sources, activity, threats) = tokio::join!(
            self.client.recent_scans(),
            self.client.data_sources(),
            self.client.system_activity(),
            self.client.threat_data(),
        );

        self.publish(DashboardSnapshot {
            generation,
            refreshed_at: Some(Local::now()),
            scans: scans.or_default(),
            sources: sources.or_default(),
            activity: activity.or_default(),
            threats: threats.or_default(),
        })
    }

    fn publish(&self, snapshot: DashboardSnapshot) -> bool {
        let generation = snapshot.generation;
        let published = self.tx.send_if_modified(|current| {
            if snapshot.generation > current.generation {
                *current = snapshot;
                true
            } else {
                false
            }
        });
        if !published {
            debug!(generation, "Dropped stale dashboard snapshot");
        }
        published
    }

    /// Refreshes now and then every `period` until `shutdown` fires.
    pub fn spawn_poller(self: Arc<Self>, period: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(period_secs = period.as_secs(), "Dashboard poller started");
            let mut interval = tokio::time::interval(period);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        tokio::select! {
                            _ = self.refresh() => {}
                            _ = shutdown.cancelled() => {
                                info!("Dashboard poller interrupted mid-refresh");
                                break;
                            }
                        }
                    }
                    _ = shutdown.cancelled() => {
                        info!("Dashboard poller shutting down");
                        break;
                    }
                }
            }
        })
    }
}
