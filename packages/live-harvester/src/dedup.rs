//! Dedup & append engine.
//!
//! A snapshot is filtered against the seen-set into a [`NovelBatch`]. The
//! seen-set only learns the batch through [`SeenSet::commit`], which the
//! scheduler calls after the store accepted the batch. A failed append
//! therefore leaves the seen-set exactly as it was.

use chrono::Local;
use std::collections::HashSet;

use crate::types::{CommentaryRecord, Identity, IdentityStrategy, RawRecord};

/// Identities already persisted for the tracked event.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: HashSet<Identity>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted history. Records without an identity under
    /// `strategy` are ignored.
    pub fn from_records(records: &[CommentaryRecord], strategy: &IdentityStrategy) -> Self {
        let mut seen = Self::new();
        let mut unidentified = 0usize;
        for record in records {
            match strategy.identify(&record.payload) {
                Some(id) => {
                    seen.ids.insert(id);
                }
                None => unidentified += 1,
            }
        }
        if unidentified > 0 {
            tracing::warn!(
                unidentified,
                field = %strategy.field(),
                "Persisted records without identity field"
            );
        }
        seen
    }

    pub fn contains(&self, id: &Identity) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Record a persisted batch.
    pub fn commit(&mut self, batch: &NovelBatch) {
        self.ids.extend(batch.identities.iter().cloned());
    }
}

/// Records from one snapshot that were not seen before, in snapshot order.
#[derive(Debug, Clone, Default)]
pub struct NovelBatch {
    pub records: Vec<CommentaryRecord>,
    identities: Vec<Identity>,
    /// Snapshot entries without a usable identity.
    pub unidentified: usize,
}

impl NovelBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }
}

pub struct DedupEngine {
    strategy: IdentityStrategy,
}

impl DedupEngine {
    pub fn new(strategy: IdentityStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &IdentityStrategy {
        &self.strategy
    }

    /// Filter a snapshot down to unseen records. An identity repeated within
    /// the snapshot is emitted once, at its first position.
    pub fn novel(&self, snapshot: Vec<RawRecord>, seen: &SeenSet, event_label: &str) -> NovelBatch {
        let observed_at = Local::now();
        let mut batch = NovelBatch::default();
        let mut in_batch: HashSet<Identity> = HashSet::new();

        for raw in snapshot {
            let Some(id) = self.strategy.identify(&raw.payload) else {
                batch.unidentified += 1;
                continue;
            };
            if seen.contains(&id) || !in_batch.insert(id.clone()) {
                continue;
            }
            batch.identities.push(id);
            batch
                .records
                .push(CommentaryRecord::observed_at(observed_at, event_label, raw));
        }

        if batch.unidentified > 0 {
            tracing::debug!(
                unidentified = batch.unidentified,
                field = %self.strategy.field(),
                "Snapshot entries without identity skipped"
            );
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<RawRecord> {
        items.iter().map(|t| RawRecord::text(*t)).collect()
    }

    fn ids(batch: &NovelBatch) -> Vec<&str> {
        batch.identities().iter().map(Identity::as_str).collect()
    }

    #[test]
    fn same_snapshot_twice_yields_nothing_new() {
        let engine = DedupEngine::new(IdentityStrategy::text());
        let mut seen = SeenSet::new();

        let first = engine.novel(texts(&["a", "b"]), &seen, "IND vs AUS");
        assert_eq!(ids(&first), vec!["a", "b"]);
        seen.commit(&first);

        let second = engine.novel(texts(&["a", "b"]), &seen, "IND vs AUS");
        assert!(second.is_empty());
    }

    #[test]
    fn novel_subset_keeps_snapshot_order() {
        let engine = DedupEngine::new(IdentityStrategy::text());
        let mut seen = SeenSet::new();
        seen.commit(&engine.novel(texts(&["b"]), &seen, "x"));

        let batch = engine.novel(texts(&["d", "b", "c", "a"]), &seen, "x");
        assert_eq!(ids(&batch), vec!["d", "c", "a"]);
        assert_eq!(batch.records[0].payload["text"], "d");
        assert_eq!(batch.records[0].event_label, "x");
    }

    #[test]
    fn uncommitted_batch_is_not_remembered() {
        let engine = DedupEngine::new(IdentityStrategy::text());
        let seen = SeenSet::new();

        let _dropped = engine.novel(texts(&["a"]), &seen, "x");
        assert!(seen.is_empty());
        assert_eq!(engine.novel(texts(&["a"]), &seen, "x").len(), 1);
    }

    #[test]
    fn repeats_within_a_snapshot_are_emitted_once() {
        let engine = DedupEngine::new(IdentityStrategy::text());
        let batch = engine.novel(texts(&["a", "b", "a"]), &SeenSet::new(), "x");
        assert_eq!(ids(&batch), vec!["a", "b"]);
    }

    #[test]
    fn sequence_identity_skips_records_without_field() {
        let engine = DedupEngine::new(IdentityStrategy::sequence("id"));
        let snapshot = vec![
            RawRecord::default().with_field("id", 101).with_field("text", "dot ball"),
            RawRecord::text("no id here"),
            RawRecord::default().with_field("id", 102),
        ];

        let batch = engine.novel(snapshot, &SeenSet::new(), "x");
        assert_eq!(ids(&batch), vec!["101", "102"]);
        assert_eq!(batch.unidentified, 1);
    }

    #[test]
    fn seen_set_rebuilds_from_history() {
        let strategy = IdentityStrategy::text();
        let history = vec![
            CommentaryRecord::new("x", RawRecord::text("a")),
            CommentaryRecord::new("x", RawRecord::default().with_field("other", 1)),
            CommentaryRecord::new("x", RawRecord::text("b")),
        ];

        let seen = SeenSet::from_records(&history, &strategy);
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&Identity::from("a")));
        assert!(!seen.contains(&Identity::from("c")));
    }
}
