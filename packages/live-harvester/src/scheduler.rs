//! Poll scheduler.
//!
//! Drives one harvesting run through its states:
//!
//! ```text
//! INIT ──discover──► SELECTING ──select──► POLLING ──cancel / unwritable──► STOPPED
//!                        │                                                     ▲
//!                        └───────────── no trackable event ────────────────────┘
//! ```
//!
//! Each POLLING cycle is sample → dedup → append → commit, followed by an
//! optional capture when something new was stored. Cycle errors are logged
//! and the loop carries on at the next tick. Cancellation is checked before
//! every cycle and during every wait, never in the middle of a cycle.

use std::path::PathBuf;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::classifier::classify;
use crate::dedup::{DedupEngine, SeenSet};
use crate::error::{HarvestError, Result};
use crate::selector::select_event;
use crate::traits::{EventDiscoverer, FeedSampler, HarvestObserver, RecordStore, SnapshotCapturer};
use crate::types::{Classification, DiscoveredEvent, IdentityStrategy};

/// Configuration for the poll loop.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Wait between the end of one cycle and the start of the next
    pub poll_interval: Duration,
    /// Consecutive failed appends before polling stops. 0 never stops.
    pub max_write_failures: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(20),
            max_write_failures: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestState {
    Init,
    Selecting,
    Polling,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Cancellation was requested
    Cancelled,
    /// Discovery produced neither a live nor a completed event
    NoTrackableEvent,
    /// Appends kept failing
    StoreUnwritable { failures: u32 },
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    /// Entries in the snapshot
    pub sampled: usize,
    /// Records appended to the store
    pub appended: usize,
    /// Snapshot entries without a usable identity
    pub unidentified: usize,
    pub capture: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub appended: usize,
    pub sample_failures: u64,
    pub write_failures: u64,
}

/// State of one tracked event while it is being polled.
#[derive(Debug)]
pub struct PollSession {
    pub event: DiscoveredEvent,
    pub label: String,
    seen: SeenSet,
    consecutive_write_failures: u32,
    pub stats: RunStats,
}

impl PollSession {
    pub fn new(event: DiscoveredEvent, label: impl Into<String>, seen: SeenSet) -> Self {
        Self {
            event,
            label: label.into(),
            seen,
            consecutive_write_failures: 0,
            stats: RunStats::default(),
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn consecutive_write_failures(&self) -> u32 {
        self.consecutive_write_failures
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub event: Option<DiscoveredEvent>,
    pub label: Option<String>,
    pub stats: RunStats,
    pub reason: StopReason,
}

impl RunSummary {
    /// Fatal stop reasons as errors; a cancelled run is `Ok`.
    pub fn into_result(self) -> Result<Self> {
        match self.reason {
            StopReason::Cancelled => Ok(self),
            StopReason::NoTrackableEvent => Err(HarvestError::NoTrackableEvent),
            StopReason::StoreUnwritable { failures } => {
                Err(HarvestError::StoreUnwritable { failures })
            }
        }
    }
}

pub struct Harvester<D, F, S> {
    discoverer: D,
    sampler: F,
    store: S,
    engine: DedupEngine,
    base_url: Url,
    capturer: Option<Box<dyn SnapshotCapturer>>,
    observer: Option<Box<dyn HarvestObserver>>,
    config: SchedulerConfig,
    state: HarvestState,
}

impl<D, F, S> Harvester<D, F, S>
where
    D: EventDiscoverer,
    F: FeedSampler,
    S: RecordStore,
{
    pub fn new(
        discoverer: D,
        sampler: F,
        store: S,
        strategy: IdentityStrategy,
        base_url: Url,
    ) -> Self {
        Self {
            discoverer,
            sampler,
            store,
            engine: DedupEngine::new(strategy),
            base_url,
            capturer: None,
            observer: None,
            config: SchedulerConfig::default(),
            state: HarvestState::Init,
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_capturer(mut self, capturer: Box<dyn SnapshotCapturer>) -> Self {
        self.capturer = Some(capturer);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn HarvestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> HarvestState {
        self.state
    }

    pub fn discoverer(&self) -> &D {
        &self.discoverer
    }

    pub fn sampler(&self) -> &F {
        &self.sampler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn transition(&mut self, next: HarvestState) {
        debug!(from = ?self.state, to = ?next, "Harvester state change");
        self.state = next;
    }

    /// Discover and classify events, persisting the classification.
    ///
    /// Discovery failures yield an empty classification.
    pub async fn discover(&mut self) -> Classification {
        let raw = match self.discoverer.discover().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Discovery failed, continuing with no events");
                Vec::new()
            }
        };

        let classification = classify(raw, &self.base_url);
        if let Err(e) = self.store.save_discovery(&classification).await {
            warn!(error = %e, "Failed to persist discovery snapshot");
        }
        if let Some(observer) = &self.observer {
            observer.on_classified(&classification);
        }

        self.transition(HarvestState::Selecting);
        classification
    }

    /// Start tracking `event`: capture its label and rebuild the seen-set
    /// from persisted history.
    pub async fn begin(&mut self, event: DiscoveredEvent) -> PollSession {
        let label = match self.sampler.describe(&event).await {
            Ok(label) if !label.trim().is_empty() => label,
            Ok(_) => event.title.clone(),
            Err(e) => {
                warn!(event = %event.title, error = %e, "Could not read event label, using title");
                event.title.clone()
            }
        };

        let history = match self.store.load().await {
            Ok(history) => history,
            Err(e) => {
                warn!(error = %e, "Could not load history, starting empty");
                Vec::new()
            }
        };
        let seen = SeenSet::from_records(&history, self.engine.strategy());

        info!(
            event = %event.title,
            id = %event.id,
            category = %event.category,
            label = %label,
            history = history.len(),
            seen = seen.len(),
            "Tracking event"
        );
        if let Some(observer) = &self.observer {
            observer.on_selected(&event, &label);
        }

        self.transition(HarvestState::Polling);
        PollSession::new(event, label, seen)
    }

    /// One poll cycle. The seen-set only learns new identities once the
    /// store accepted them.
    pub async fn poll_once(&self, session: &mut PollSession) -> Result<CycleReport> {
        session.stats.cycles += 1;
        let cycle = session.stats.cycles;

        let snapshot = self.sampler.sample(&session.event).await?;
        let sampled = snapshot.len();

        let batch = self.engine.novel(snapshot, &session.seen, &session.label);
        if batch.unidentified > 0 {
            debug!(cycle, unidentified = batch.unidentified, "Skipped entries without identity");
        }
        if batch.is_empty() {
            debug!(cycle, sampled, "No new commentary");
            return Ok(CycleReport {
                cycle,
                sampled,
                unidentified: batch.unidentified,
                ..Default::default()
            });
        }

        self.store.append(&batch.records).await?;
        session.seen.commit(&batch);
        session.stats.appended += batch.len();
        info!(cycle, sampled, appended = batch.len(), "Stored new commentary");

        let capture = match &self.capturer {
            Some(capturer) => match capturer.capture(&session.event).await {
                Ok(path) => {
                    debug!(path = %path.display(), "Saved snapshot");
                    Some(path)
                }
                Err(e) => {
                    warn!(error = %e, "Snapshot capture failed");
                    None
                }
            },
            None => None,
        };

        Ok(CycleReport {
            cycle,
            sampled,
            appended: batch.len(),
            unidentified: batch.unidentified,
            capture,
        })
    }

    /// Poll until cancelled or the store is declared unwritable.
    pub async fn poll(&self, session: &mut PollSession, cancel: &CancellationToken) -> StopReason {
        loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            match self.poll_once(session).await {
                Ok(report) => {
                    if report.appended > 0 {
                        session.consecutive_write_failures = 0;
                    }
                    if let Some(observer) = &self.observer {
                        observer.on_cycle(&report);
                    }
                }
                Err(e @ (HarvestError::StoreWrite { .. } | HarvestError::Json(_))) => {
                    session.consecutive_write_failures += 1;
                    session.stats.write_failures += 1;
                    error!(
                        consecutive = session.consecutive_write_failures,
                        error = %e,
                        "Append failed, batch will be retried"
                    );
                    if let Some(observer) = &self.observer {
                        observer.on_cycle_error(&e);
                    }

                    let max = self.config.max_write_failures;
                    if max > 0 && session.consecutive_write_failures >= max {
                        break StopReason::StoreUnwritable {
                            failures: session.consecutive_write_failures,
                        };
                    }
                }
                Err(e) => {
                    session.stats.sample_failures += 1;
                    warn!(error = %e, "Poll cycle failed");
                    if let Some(observer) = &self.observer {
                        observer.on_cycle_error(&e);
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// Track an already chosen event until stopped. The sampler is closed
    /// on every exit.
    pub async fn track(&mut self, event: DiscoveredEvent, cancel: &CancellationToken) -> RunSummary {
        let mut session = self.begin(event).await;
        let reason = self.poll(&mut session, cancel).await;
        self.stop(&reason).await;

        RunSummary {
            event: Some(session.event),
            label: Some(session.label),
            stats: session.stats,
            reason,
        }
    }

    /// Full run: discover, select, poll.
    pub async fn run(&mut self, cancel: &CancellationToken) -> RunSummary {
        let classification = self.discover().await;

        let event = match select_event(&classification) {
            Ok(event) => event.clone(),
            Err(e) => {
                warn!(error = %e, "Nothing to track");
                let reason = StopReason::NoTrackableEvent;
                self.stop(&reason).await;
                return RunSummary {
                    event: None,
                    label: None,
                    stats: RunStats::default(),
                    reason,
                };
            }
        };

        self.track(event, cancel).await
    }

    /// Release the sampler without tracking anything, e.g. when the
    /// operator's choice cannot be honoured.
    pub async fn shutdown(&mut self) {
        self.sampler.close().await;
        self.transition(HarvestState::Stopped);
    }

    async fn stop(&mut self, reason: &StopReason) {
        info!(reason = ?reason, "Harvester stopped");
        self.shutdown().await;
    }
}
