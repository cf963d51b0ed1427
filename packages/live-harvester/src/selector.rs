use crate::error::{HarvestError, Result};
use crate::types::{Classification, DiscoveredEvent};

/// Pick the event to track: the first LIVE event, else the first COMPLETED
/// one. UPCOMING events have no commentary yet and are never picked.
pub fn select_event(classification: &Classification) -> Result<&DiscoveredEvent> {
    classification
        .live
        .first()
        .or_else(|| classification.completed.first())
        .ok_or(HarvestError::NoTrackableEvent)
}
