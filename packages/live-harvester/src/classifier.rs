//! Event classification.
//!
//! Rules, in order, over the lowercased status text:
//! 1. live-indicator token → LIVE
//! 2. completion token → COMPLETED
//! 3. anything else → UPCOMING
//!
//! Tokens match at a word start, so `live` does not fire inside `delivery`
//! but `rain stop` does fire on `rain stopped play`.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::types::{Category, Classification, DiscoveredEvent, RawEvent};

const LIVE_PATTERN: &str = r"\b(?:live|trail by|start delayed|rain stop|day \d+)";
const COMPLETED_PATTERN: &str = r"\b(?:won by|lead by|result|stumps|innings|overs|all out)";

fn live_tokens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LIVE_PATTERN).expect("static regex"))
}

fn completed_tokens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COMPLETED_PATTERN).expect("static regex"))
}

/// Category for a raw status string.
pub fn classify_status(status_text: &str) -> Category {
    let status = status_text.to_lowercase();
    if live_tokens().is_match(&status) {
        Category::Live
    } else if completed_tokens().is_match(&status) {
        Category::Completed
    } else {
        Category::Upcoming
    }
}

fn numeric_id(segment: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?:^|-)(\d+)$").expect("static regex"));
    re.captures(segment).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// Event identifier carried in a link: the numeric tail of the last path
/// segment that has one (`/series/x-100/ind-vs-aus-1234/live` → `1234`,
/// `/match/1` → `1`). Relative links are resolved against `base`.
pub fn event_id(url: &str, base: &Url) -> Option<(Url, String)> {
    let resolved = base.join(url.trim()).ok()?;
    let id = resolved
        .path_segments()?
        .filter_map(numeric_id)
        .last()?
        .to_string();
    Some((resolved, id))
}

/// Classify raw items into the three buckets, preserving discovery order.
///
/// Items without an extractable identifier are dropped, as are repeated
/// titles within a bucket.
pub fn classify(raw: Vec<RawEvent>, base: &Url) -> Classification {
    let mut classification = Classification::default();

    for item in raw {
        let Some((url, id)) = event_id(&item.url, base) else {
            tracing::debug!(title = %item.title, url = %item.url, "Dropping event without identifier");
            continue;
        };

        let category = classify_status(&item.status_text);
        let event = DiscoveredEvent {
            title: item.title,
            status_text: item.status_text,
            url: url.to_string(),
            id,
            category,
        };

        if !classification.push(event) {
            tracing::debug!(%category, "Dropping duplicate title");
        }
    }

    tracing::info!(
        live = classification.live.len(),
        upcoming = classification.upcoming.len(),
        completed = classification.completed.len(),
        "Classified events"
    );

    classification
}
