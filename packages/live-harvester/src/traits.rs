use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{HarvestError, Result};
use crate::scheduler::CycleReport;
use crate::types::{Classification, CommentaryRecord, DiscoveredEvent, RawEvent, RawRecord};

// ============================================================================
// DISCOVERY: What events exist right now
// ============================================================================

#[async_trait]
pub trait EventDiscoverer: Send + Sync {
    /// Raw items in source order. Failures map to `HarvestError::Discovery`.
    async fn discover(&self) -> Result<Vec<RawEvent>>;
}

// ============================================================================
// FEED SAMPLER: Full point-in-time snapshot of one event's feed
// ============================================================================

#[async_trait]
pub trait FeedSampler: Send + Sync {
    /// Current full snapshot for `event`. Stateless across calls.
    async fn sample(&self, event: &DiscoveredEvent) -> Result<Vec<RawRecord>>;

    /// Human-readable label for the tracked event, captured once.
    async fn describe(&self, event: &DiscoveredEvent) -> Result<String> {
        Ok(event.title.clone())
    }

    /// Release transport resources. Called once when polling stops.
    async fn close(&self) {}
}

#[async_trait]
impl<T: FeedSampler + ?Sized> FeedSampler for Box<T> {
    async fn sample(&self, event: &DiscoveredEvent) -> Result<Vec<RawRecord>> {
        (**self).sample(event).await
    }

    async fn describe(&self, event: &DiscoveredEvent) -> Result<String> {
        (**self).describe(event).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}

// ============================================================================
// STORE: Append-only commentary log + discovery snapshot
// ============================================================================

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every persisted record, in append order. Unreadable state degrades to
    /// an empty history.
    async fn load(&self) -> Result<Vec<CommentaryRecord>>;

    /// Persist a batch. All-or-nothing.
    async fn append(&self, records: &[CommentaryRecord]) -> Result<()>;

    /// Replace the discovery snapshot wholesale.
    async fn save_discovery(&self, classification: &Classification) -> Result<()>;
}

// ============================================================================
// CAPTURE: Best-effort side artifact
// ============================================================================

#[async_trait]
pub trait SnapshotCapturer: Send + Sync {
    /// Save a visual/archival copy of the event page. Returns where it went.
    async fn capture(&self, event: &DiscoveredEvent) -> Result<PathBuf>;
}

// ============================================================================
// OBSERVER: Operator-facing progress (console, metrics)
// ============================================================================

pub trait HarvestObserver: Send + Sync {
    fn on_classified(&self, _classification: &Classification) {}

    fn on_selected(&self, _event: &DiscoveredEvent, _label: &str) {}

    fn on_cycle(&self, _report: &CycleReport) {}

    fn on_cycle_error(&self, _error: &HarvestError) {}
}
