use async_trait::async_trait;
use cricinfo_client::CricinfoClient;

use crate::error::{HarvestError, Result};
use crate::traits::FeedSampler;
use crate::types::{DiscoveredEvent, RawRecord};

/// Samples the text rendered in the commentary container of the event page.
///
/// Each distinct line becomes `{"text": ...}`; identity is the text itself.
pub struct PageTextSampler {
    client: CricinfoClient,
    selectors: Vec<String>,
}

impl PageTextSampler {
    pub fn new(client: CricinfoClient, selectors: Vec<String>) -> Self {
        Self { client, selectors }
    }
}

#[async_trait]
impl FeedSampler for PageTextSampler {
    async fn sample(&self, event: &DiscoveredEvent) -> Result<Vec<RawRecord>> {
        let texts = self
            .client
            .commentary_texts(&event.url, &self.selectors)
            .await
            .map_err(HarvestError::sample)?;

        Ok(texts.into_iter().map(RawRecord::text).collect())
    }

    async fn describe(&self, event: &DiscoveredEvent) -> Result<String> {
        let title = self
            .client
            .page_title(&event.url)
            .await
            .map_err(HarvestError::sample)?;
        Ok(title.unwrap_or_else(|| event.title.clone()))
    }
}
