//! In-memory storage implementation for testing and dry runs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use crate::error::{HarvestError, Result};
use crate::traits::RecordStore;
use crate::types::{Classification, CommentaryRecord};

/// In-memory record store.
///
/// Appends can be made to fail on demand to exercise the scheduler's
/// write-failure handling. Data is lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CommentaryRecord>>,
    discovery: RwLock<Option<Classification>>,
    failing_appends: AtomicU32,
    append_attempts: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing history.
    pub fn with_records(records: Vec<CommentaryRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            ..Self::default()
        }
    }

    /// Make the next `n` appends fail.
    pub fn fail_next_appends(&self, n: u32) {
        self.failing_appends.store(n, Ordering::SeqCst);
    }

    /// Make every append fail from now on.
    pub fn fail_all_appends(&self) {
        self.fail_next_appends(u32::MAX);
    }

    pub fn records(&self) -> Vec<CommentaryRecord> {
        self.records.read().unwrap().clone()
    }

    pub fn discovery(&self) -> Option<Classification> {
        self.discovery.read().unwrap().clone()
    }

    pub fn append_attempts(&self) -> u32 {
        self.append_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self) -> Result<Vec<CommentaryRecord>> {
        Ok(self.records())
    }

    async fn append(&self, records: &[CommentaryRecord]) -> Result<()> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_appends.load(Ordering::SeqCst);
        if failing > 0 {
            if failing != u32::MAX {
                self.failing_appends.store(failing - 1, Ordering::SeqCst);
            }
            return Err(HarvestError::store_write(
                "memory",
                std::io::Error::other("injected append failure"),
            ));
        }

        self.records.write().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn save_discovery(&self, classification: &Classification) -> Result<()> {
        *self.discovery.write().unwrap() = Some(classification.clone());
        Ok(())
    }
}
