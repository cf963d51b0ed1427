use async_trait::async_trait;
use chrono::Local;
use cricinfo_client::CricinfoClient;
use std::path::PathBuf;

use crate::error::{HarvestError, Result};
use crate::traits::SnapshotCapturer;
use crate::types::DiscoveredEvent;

/// Saves the event page as `commentary_<YYYYmmdd_HHMMSS>.html`.
pub struct HtmlSnapshotCapturer {
    client: CricinfoClient,
    dir: PathBuf,
}

impl HtmlSnapshotCapturer {
    pub fn new(client: CricinfoClient, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl SnapshotCapturer for HtmlSnapshotCapturer {
    async fn capture(&self, event: &DiscoveredEvent) -> Result<PathBuf> {
        let html = self
            .client
            .fetch_html(&event.url)
            .await
            .map_err(HarvestError::capture)?;

        let path = self.dir.join(format!(
            "commentary_{}.html",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        tokio::fs::write(&path, html)
            .await
            .map_err(HarvestError::capture)?;
        Ok(path)
    }
}
