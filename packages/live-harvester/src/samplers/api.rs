use async_trait::async_trait;
use cricinfo_client::{comments_api_url, match_ids, CricinfoClient, CricinfoError};
use serde_json::Value;

use crate::error::{HarvestError, Result};
use crate::traits::FeedSampler;
use crate::types::{DiscoveredEvent, RawRecord};

/// Samples a structured commentary API.
///
/// The URL template is filled with the series and match ids found in the
/// event URL. Each object in the array at `pointer` is one record, kept
/// whole as the payload.
pub struct StructuredApiSampler {
    client: CricinfoClient,
    template: String,
    pointer: String,
    newest_first: bool,
}

impl StructuredApiSampler {
    pub fn new(client: CricinfoClient, template: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            client,
            template: template.into(),
            pointer: pointer.into(),
            newest_first: true,
        }
    }

    /// Whether the API lists the newest entry first. Such snapshots are
    /// reversed so records are appended oldest first.
    pub fn newest_first(mut self, newest_first: bool) -> Self {
        self.newest_first = newest_first;
        self
    }

    pub fn feed_url(&self, event: &DiscoveredEvent) -> Result<String> {
        let ids = match_ids(&event.url).ok_or_else(|| HarvestError::UnsupportedLocator {
            url: event.url.clone(),
        })?;
        Ok(comments_api_url(&self.template, ids))
    }
}

/// Objects in the array at `pointer`, in document order. Non-object
/// entries are skipped.
pub fn records_at(mut document: Value, pointer: &str) -> cricinfo_client::Result<Vec<RawRecord>> {
    let items = document
        .pointer_mut(pointer)
        .map(Value::take)
        .and_then(|v| match v {
            Value::Array(items) => Some(items),
            _ => None,
        })
        .ok_or_else(|| CricinfoError::MissingJson {
            pointer: pointer.to_string(),
        })?;

    Ok(items.into_iter().filter_map(RawRecord::from_value).collect())
}

#[async_trait]
impl FeedSampler for StructuredApiSampler {
    async fn sample(&self, event: &DiscoveredEvent) -> Result<Vec<RawRecord>> {
        let url = self.feed_url(event)?;
        let document = self
            .client
            .fetch_json(&url)
            .await
            .map_err(HarvestError::sample)?;

        let mut records = records_at(document, &self.pointer).map_err(HarvestError::sample)?;
        if self.newest_first {
            records.reverse();
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn records_are_taken_from_pointer() {
        let doc = json!({
            "comments": [
                {"id": 3, "title": "Starc to Kohli", "totalRuns": 4},
                "not an object",
                {"id": 2, "title": "Starc to Kohli", "totalRuns": 0}
            ]
        });

        let records = records_at(doc, "/comments").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload["id"], 3);
        assert_eq!(records[1].payload["totalRuns"], 0);
    }

    #[test]
    fn missing_array_is_an_error() {
        let err = records_at(json!({"comments": {}}), "/comments").unwrap_err();
        assert!(matches!(err, CricinfoError::MissingJson { .. }));
        assert!(records_at(json!({}), "/comments").is_err());
    }

    #[test]
    fn feed_url_needs_series_and_match_ids() {
        let client = CricinfoClient::new(Duration::from_secs(1)).unwrap();
        let sampler = StructuredApiSampler::new(
            client,
            "https://api.example/comments?series={series_id}&match={match_id}",
            "/comments",
        );

        let mut event = DiscoveredEvent {
            title: "CSK vs RCB".to_string(),
            status_text: "Live".to_string(),
            url: "https://www.espncricinfo.com/series/ipl-2024-1410320/csk-vs-rcb-1st-match-1422119/live-cricket-score".to_string(),
            id: "1422119".to_string(),
            category: Category::Live,
        };
        assert_eq!(
            sampler.feed_url(&event).unwrap(),
            "https://api.example/comments?series=1410320&match=1422119"
        );

        event.url = "https://www.espncricinfo.com/match/1".to_string();
        assert!(matches!(
            sampler.feed_url(&event),
            Err(HarvestError::UnsupportedLocator { .. })
        ));
    }
}
