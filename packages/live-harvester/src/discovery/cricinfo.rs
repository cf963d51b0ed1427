use async_trait::async_trait;
use cricinfo_client::CricinfoClient;

use crate::error::{HarvestError, Result};
use crate::traits::EventDiscoverer;
use crate::types::RawEvent;

/// Discovers matches from the ESPNcricinfo live scores page.
pub struct CricinfoDiscoverer {
    client: CricinfoClient,
}

impl CricinfoDiscoverer {
    pub fn new(client: CricinfoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventDiscoverer for CricinfoDiscoverer {
    async fn discover(&self) -> Result<Vec<RawEvent>> {
        let cards = self
            .client
            .live_scores()
            .await
            .map_err(HarvestError::discovery)?;

        Ok(cards
            .into_iter()
            .map(|card| RawEvent::new(card.title, card.status, card.url))
            .collect())
    }
}
