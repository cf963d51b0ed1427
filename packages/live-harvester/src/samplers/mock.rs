//! Mock feed sampler for testing.
//!
//! Plays back a script of snapshots and failures, one step per `sample`
//! call. Once the script runs out the last snapshot is repeated, like a
//! feed that stopped changing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{HarvestError, Result};
use crate::traits::FeedSampler;
use crate::types::{DiscoveredEvent, RawRecord};

#[derive(Debug, Clone)]
enum Step {
    Snapshot(Vec<RawRecord>),
    Fail,
}

#[derive(Default)]
pub struct MockSampler {
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Vec<RawRecord>>,
    label: Option<String>,
    cancel_when_done: Option<CancellationToken>,
    sample_calls: AtomicUsize,
    closed: AtomicBool,
}

impl MockSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot.
    pub fn with_snapshot(self, records: Vec<RawRecord>) -> Self {
        self.script.lock().unwrap().push_back(Step::Snapshot(records));
        self
    }

    /// Queue a snapshot of `{"text": ...}` records.
    pub fn with_texts(self, texts: &[&str]) -> Self {
        self.with_snapshot(texts.iter().map(|t| RawRecord::text(*t)).collect())
    }

    /// Queue a transport failure.
    pub fn with_failure(self) -> Self {
        self.script.lock().unwrap().push_back(Step::Fail);
        self
    }

    /// Label returned by `describe`.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Cancel `token` when the last scripted step has been played.
    pub fn cancel_when_done(mut self, token: CancellationToken) -> Self {
        self.cancel_when_done = Some(token);
        self
    }

    pub fn sample_calls(&self) -> usize {
        self.sample_calls.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSampler for MockSampler {
    async fn sample(&self, _event: &DiscoveredEvent) -> Result<Vec<RawRecord>> {
        self.sample_calls.fetch_add(1, Ordering::SeqCst);

        let (step, exhausted) = {
            let mut script = self.script.lock().unwrap();
            let step = script.pop_front();
            (step, script.is_empty())
        };
        if exhausted {
            if let Some(token) = &self.cancel_when_done {
                token.cancel();
            }
        }

        match step {
            Some(Step::Snapshot(records)) => {
                *self.last.lock().unwrap() = records.clone();
                Ok(records)
            }
            Some(Step::Fail) => Err(HarvestError::sample(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "mock feed timed out",
            ))),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }

    async fn describe(&self, event: &DiscoveredEvent) -> Result<String> {
        Ok(self.label.clone().unwrap_or_else(|| event.title.clone()))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
