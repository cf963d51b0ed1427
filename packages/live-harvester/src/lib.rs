//! Live Commentary Harvester
//!
//! Discovers sporting events, classifies them as LIVE / UPCOMING /
//! COMPLETED, picks one to follow and polls its commentary feed. Each poll
//! returns a full snapshot; only entries never seen before are appended to
//! a crash-safe, append-only log.
//!
//! # Usage
//!
//! ```rust,ignore
//! use live_harvester::{Harvester, IdentityStrategy, MemoryStore};
//! use live_harvester::discovery::MockDiscoverer;
//! use live_harvester::samplers::MockSampler;
//!
//! let mut harvester = Harvester::new(
//!     MockDiscoverer::new(events),
//!     MockSampler::new().with_texts(&["a", "b"]),
//!     MemoryStore::new(),
//!     IdentityStrategy::text(),
//!     base_url,
//! );
//! let summary = harvester.run(&CancellationToken::new()).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (discovery, feed, store, capture)
//! - [`types`] - Events, records and identity rules
//! - [`classifier`] / [`selector`] - Event bucketing and choice
//! - [`dedup`] - Seen-set and novelty filtering
//! - [`scheduler`] - The poll loop and its state machine
//! - [`stores`] - JSON file store and in-memory store
//! - [`samplers`] / [`discovery`] - Cricinfo-backed and mock collaborators

pub mod capture;
pub mod classifier;
pub mod config;
pub mod dedup;
pub mod discovery;
pub mod error;
pub mod report;
pub mod samplers;
pub mod scheduler;
pub mod selector;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use capture::HtmlSnapshotCapturer;
pub use classifier::{classify, classify_status, event_id};
pub use config::{FeedKind, HarvestConfig};
pub use dedup::{DedupEngine, NovelBatch, SeenSet};
pub use error::{HarvestError, Result};
pub use scheduler::{
    CycleReport, HarvestState, Harvester, PollSession, RunStats, RunSummary, SchedulerConfig,
    StopReason,
};
pub use selector::select_event;
pub use stores::{JsonFileStore, MemoryStore};
pub use traits::{EventDiscoverer, FeedSampler, HarvestObserver, RecordStore, SnapshotCapturer};
pub use types::{
    Category, Classification, CommentaryRecord, DiscoveredEvent, Identity, IdentityStrategy,
    Payload, RawEvent, RawRecord,
};
