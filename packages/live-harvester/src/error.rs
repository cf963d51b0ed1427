//! Typed errors for the harvester.
//!
//! Per-cycle errors (`Sample`, `StoreWrite`) are contained by the scheduler;
//! only `NoTrackableEvent` and `StoreUnwritable` end a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the harvesting engine and its collaborators.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Event discovery collaborator unreachable or unparseable
    #[error("discovery failed: {0}")]
    Discovery(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Neither a live nor a completed event is available
    #[error("no live or completed event available")]
    NoTrackableEvent,

    /// Feed fetch or parse failed for one cycle
    #[error("feed sample failed: {0}")]
    Sample(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Event locator lacks what the feed needs (e.g. series/match ids)
    #[error("unsupported event locator: {url}")]
    UnsupportedLocator { url: String },

    /// Persisted log could not be read
    #[error("failed to read {path}: {source}")]
    StoreRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persisted log could not be written
    #[error("failed to write {path}: {source}")]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Appends kept failing; polling stopped
    #[error("store unwritable after {failures} consecutive failed appends")]
    StoreUnwritable { failures: u32 },

    /// Snapshot capture failed (never fatal)
    #[error("capture failed: {0}")]
    Capture(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    pub fn discovery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Discovery(Box::new(err))
    }

    pub fn sample(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sample(Box::new(err))
    }

    pub fn capture(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Capture(Box::new(err))
    }

    pub fn store_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::StoreWrite {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvestError>;
