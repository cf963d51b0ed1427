use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle bucket of a discovered event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Live,
    Upcoming,
    Completed,
}

impl Category {
    /// Snapshot order.
    pub const ALL: [Category; 3] = [Category::Live, Category::Upcoming, Category::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Live => "LIVE",
            Category::Upcoming => "UPCOMING",
            Category::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item as handed over by a discovery collaborator, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub title: String,
    pub status_text: String,
    pub url: String,
}

impl RawEvent {
    pub fn new(
        title: impl Into<String>,
        status_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            status_text: status_text.into(),
            url: url.into(),
        }
    }
}

/// A classified event from one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveredEvent {
    pub title: String,
    #[serde(rename = "status")]
    pub status_text: String,
    pub url: String,
    /// Identifier extracted from `url`.
    pub id: String,
    #[serde(skip)]
    pub category: Category,
}

/// The three ordered buckets produced by one discovery pass.
///
/// Serializes as the discovery snapshot:
/// `{"LIVE": [...], "UPCOMING": [...], "COMPLETED": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(rename = "LIVE")]
    pub live: Vec<DiscoveredEvent>,
    #[serde(rename = "UPCOMING")]
    pub upcoming: Vec<DiscoveredEvent>,
    #[serde(rename = "COMPLETED")]
    pub completed: Vec<DiscoveredEvent>,
}

impl Classification {
    pub fn bucket(&self, category: Category) -> &[DiscoveredEvent] {
        match category {
            Category::Live => &self.live,
            Category::Upcoming => &self.upcoming,
            Category::Completed => &self.completed,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<DiscoveredEvent> {
        match category {
            Category::Live => &mut self.live,
            Category::Upcoming => &mut self.upcoming,
            Category::Completed => &mut self.completed,
        }
    }

    /// Add an event to its bucket. Returns `false` (and drops the event)
    /// when the bucket already holds an event with the same title.
    pub fn push(&mut self, event: DiscoveredEvent) -> bool {
        let bucket = self.bucket_mut(event.category);
        if bucket.iter().any(|e| e.title == event.title) {
            return false;
        }
        bucket.push(event);
        true
    }

    pub fn len(&self) -> usize {
        self.live.len() + self.upcoming.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All events, LIVE then UPCOMING then COMPLETED.
    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredEvent> {
        self.live
            .iter()
            .chain(self.upcoming.iter())
            .chain(self.completed.iter())
    }

    /// Event at a zero-based position in [`Classification::iter`] order.
    pub fn nth(&self, index: usize) -> Option<&DiscoveredEvent> {
        self.iter().nth(index)
    }
}
