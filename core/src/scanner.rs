//! # Scan Simulator
//!
//! Fabricates the multi-phase progress narrative of a security scan. Nothing
//! is probed; the only outside calls are one host-index lookup and, for some
//! scan types, one reputation lookup through the [`DataFetchClient`], whose
//! contents are narrated as findings.
//!
//! Phases run strictly in sequence. Between phases the run checks its
//! [`CancellationToken`], and every staged delay or lookup is raced against
//! it, so tearing down the view stops the run at the next boundary.
//!
//! Lookup failures are narrated as a single error event and the run goes on:
//! an uncancelled scan always ends with the "Scan completed" event at 100%.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use kalium_common::config::DEFAULT_STEP_DELAY;
use kalium_common::error::ParamError;
use kalium_common::models::progress::{ScanProgress, ScanState};
use kalium_common::models::scan::{ScanKind, ScanParams};
use kalium_protocols::shodan::{self, HostMatch};
use kalium_protocols::urlscan::SearchResult;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{DataFetchClient, FetchOutcome};

pub mod steps;

use steps::StepCounter;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("a scan is already running")]
    AlreadyRunning,
    #[error("invalid scan configuration: {0}")]
    InvalidParams(#[from] ParamError),
}

/// Summary of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanReport {
    pub kind: ScanKind,
    pub state: ScanState,
    pub total_steps: u32,
    /// Number of progress events emitted.
    pub events: u32,
}

/// Tracks the state of the single scan a session may run at a time.
#[derive(Debug, Default)]
pub struct ScanSession {
    state: AtomicU8,
}

impl ScanSession {
    pub fn state(&self) -> ScanState {
        decode_state(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == ScanState::Running
    }

    fn begin(&self) -> Result<RunGuard<'_>, ScanError> {
        let running = encode_state(ScanState::Running);
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if current == running {
                return Err(ScanError::AlreadyRunning);
            }
            match self.state.compare_exchange(
                current,
                running,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(RunGuard { session: self }),
                Err(actual) => current = actual,
            }
        }
    }

    fn set(&self, state: ScanState) {
        self.state.store(encode_state(state), Ordering::Release);
    }

    /// Moves an idle or finished session to `Failed`. A running session is left alone.
    fn mark_failed(&self) -> bool {
        let running = encode_state(ScanState::Running);
        let failed = encode_state(ScanState::Failed);
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != running).then_some(failed)
            })
            .is_ok()
    }
}

/// Marks the session cancelled if a run is dropped before reaching a terminal state.
struct RunGuard<'a> {
    session: &'a ScanSession,
}

impl RunGuard<'_> {
    fn finish(self, state: ScanState) {
        self.session.set(state);
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_running() {
            self.session.set(ScanState::Cancelled);
        }
    }
}

fn encode_state(state: ScanState) -> u8 {
    match state {
        ScanState::Idle => 0,
        ScanState::Running => 1,
        ScanState::Completed => 2,
        ScanState::Failed => 3,
        ScanState::Cancelled => 4,
    }
}

fn decode_state(raw: u8) -> ScanState {
    match raw {
        1 => ScanState::Running,
        2 => ScanState::Completed,
        3 => ScanState::Failed,
        4 => ScanState::Cancelled,
        _ => ScanState::Idle,
    }
}

pub struct ScanSimulator {
    client: Arc<DataFetchClient>,
    session: ScanSession,
    step_delay: Duration,
}

impl ScanSimulator {
    pub fn new(client: Arc<DataFetchClient>) -> Self {
        Self {
            client,
            session: ScanSession::default(),
            step_delay: DEFAULT_STEP_DELAY,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn state(&self) -> ScanState {
        self.session.state()
    }

    /// Resolves `assignments` against the catalog entry for `kind`, then runs the scan.
    ///
    /// Invalid parameters leave an idle session in [`ScanState::Failed`] without
    /// emitting any progress. A scan already running elsewhere keeps its state.
    pub async fn launch<I, K, V, F>(
        &self,
        kind: ScanKind,
        assignments: I,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<ScanReport, ScanError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
        F: FnMut(ScanProgress) + Send,
    {
        if self.session.is_running() {
            return Err(ScanError::AlreadyRunning);
        }
        let params = match kind.config().resolve(assignments) {
            Ok(params) => params,
            Err(e) => {
                warn!(scan = %kind, error = %e, "Rejected scan configuration");
                if !self.session.mark_failed() {
                    debug!(scan = %kind, "Another scan started meanwhile, state left running");
                }
                return Err(e.into());
            }
        };
        self.run(kind, &params, cancel, on_progress).await
    }

    /// Runs an already validated scan, reporting every event to `on_progress`.
    pub async fn run<F>(
        &self,
        kind: ScanKind,
        params: &ScanParams,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<ScanReport, ScanError>
    where
        F: FnMut(ScanProgress) + Send,
    {
        let guard = self.session.begin()?;
        let total_steps = steps::total_steps(kind, params);
        info!(scan = %kind, target = params.target(), total_steps, "Scan started");

        let mut run = Run {
            counter: StepCounter::new(total_steps),
            on_progress,
            cancel,
            delay: self.step_delay,
        };

        let state = match self.phases(kind, params, &mut run).await {
            Some(()) => ScanState::Completed,
            None => ScanState::Cancelled,
        };
        guard.finish(state);
        info!(scan = %kind, %state, events = run.counter.current(), "Scan finished");

        Ok(ScanReport {
            kind,
            state,
            total_steps,
            events: run.counter.current(),
        })
    }

    /// Returns `None` as soon as the run is cancelled.
    async fn phases<F>(&self, kind: ScanKind, params: &ScanParams, run: &mut Run<'_, F>) -> Option<()>
    where
        F: FnMut(ScanProgress) + Send,
    {
        let target = params.target();

        run.emit("Initializing scan...", "Setting up scan environment")?;
        run.pause().await?;

        run.emit("Validating target...", format!("Target: {target}"))?;

        let query = shodan::scan_query(kind, params);
        debug!(%query, "Host index query");
        run.emit("Querying host index...", "Fetching host information")?;
        let hosts = run.guarded(self.client.host_lookup(target, &query)).await?;
        narrate_hosts(run, hosts)?;

        if kind.checks_reputation() {
            run.emit("Querying URL reputation index...", "Analyzing web presence")?;
            let results = run.guarded(self.client.reputation_lookup(target)).await?;
            narrate_reputation(run, results)?;
        }

        if kind == ScanKind::Full || params.text("intensity") == Some("high") {
            run.emit("Performing risk assessment...", "Analyzing collected data")?;
            run.pause().await?;
        }

        run.emit("Generating final report...", "Compiling findings")?;
        run.pause().await?;

        run.complete()
    }
}

/// Mutable state of one run.
struct Run<'a, F> {
    counter: StepCounter,
    on_progress: F,
    cancel: &'a CancellationToken,
    delay: Duration,
}

impl<F> Run<'_, F>
where
    F: FnMut(ScanProgress) + Send,
{
    fn emit(&mut self, status: &str, details: impl Into<String>) -> Option<()> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let progress = self.counter.advance();
        (self.on_progress)(ScanProgress {
            progress,
            status: status.to_string(),
            details: Some(details.into()),
        });
        Some(())
    }

    fn complete(&mut self) -> Option<()> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.counter.advance();
        (self.on_progress)(ScanProgress {
            progress: 100,
            status: "Scan completed".to_string(),
            details: Some(
                "All analysis tasks have finished. Review the findings above.".to_string(),
            ),
        });
        Some(())
    }

    async fn pause(&self) -> Option<()> {
        if self.delay.is_zero() {
            return (!self.cancel.is_cancelled()).then_some(());
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            _ = tokio::time::sleep(self.delay) => Some(()),
        }
    }

    async fn guarded<T>(&self, fut: impl Future<Output = T>) -> Option<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            value = fut => Some(value),
        }
    }
}

fn narrate_hosts<F>(run: &mut Run<'_, F>, outcome: FetchOutcome<Vec<HostMatch>>) -> Option<()>
where
    F: FnMut(ScanProgress) + Send,
{
    let matches = match outcome {
        FetchOutcome::Data(matches) => matches,
        FetchOutcome::Empty => return Some(()),
        FetchOutcome::Failed(e) => {
            warn!(error = %e, "Host index lookup failed");
            return run.emit("Host index query failed", "Could not retrieve host index data");
        }
    };

    let ports = shodan::distinct_ports(&matches);
    let listed = if ports.is_empty() {
        "none".to_string()
    } else {
        ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
    };
    run.emit("Analyzing ports...", format!("Open ports detected: {listed}"))?;

    for host in &matches {
        let port = host.port.map_or_else(|| "?".to_string(), |p| p.to_string());
        if let Some(product) = &host.product {
            let version = host
                .version
                .as_deref()
                .map(|v| format!(" (v{v})"))
                .unwrap_or_default();
            run.emit("Service detection", format!("Port {port}: {product}{version}"))?;
        }
        if let Some(vulns) = &host.vulns {
            for (id, vuln) in vulns {
                run.emit(
                    "Vulnerability detected",
                    format!("{id}: {} (CVSS: {})", vuln.summary, vuln.cvss_label()),
                )?;
            }
        }
    }
    Some(())
}

fn narrate_reputation<F>(run: &mut Run<'_, F>, outcome: FetchOutcome<Vec<SearchResult>>) -> Option<()>
where
    F: FnMut(ScanProgress) + Send,
{
    let results = match outcome {
        FetchOutcome::Data(results) => results,
        FetchOutcome::Empty => return Some(()),
        FetchOutcome::Failed(e) => {
            warn!(error = %e, "Reputation lookup failed");
            return run.emit(
                "Reputation query failed",
                "Could not retrieve URL reputation data",
            );
        }
    };

    for result in &results {
        if let Some(page) = &result.page {
            let domain = page.domain.as_deref().unwrap_or("unknown");
            run.emit("Web analysis", format!("Domain: {domain}"))?;
        }
        if let Some(stats) = &result.stats {
            run.emit(
                "Security statistics",
                format!(
                    "Malicious indicators: {}, Suspicious: {}",
                    stats.malicious, stats.suspicious
                ),
            )?;
        }
        if let Some(verdict) = &result.verdict {
            let score = verdict
                .score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s}"));
            let malicious = if verdict.malicious { "Yes" } else { "No" };
            run.emit(
                "Security verdict",
                format!("Overall score: {score}, Malicious: {malicious}"),
            )?;
        }
    }
    Some(())
}
