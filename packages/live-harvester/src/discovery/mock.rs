//! Mock discoverer for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{HarvestError, Result};
use crate::traits::EventDiscoverer;
use crate::types::RawEvent;

/// Returns a canned event list, or fails every call.
#[derive(Default)]
pub struct MockDiscoverer {
    events: Vec<RawEvent>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockDiscoverer {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// A discoverer whose source is unreachable.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventDiscoverer for MockDiscoverer {
    async fn discover(&self) -> Result<Vec<RawEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(HarvestError::discovery(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock discovery unreachable",
            )));
        }
        Ok(self.events.clone())
    }
}
