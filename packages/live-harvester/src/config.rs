use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::scheduler::SchedulerConfig;
use crate::types::IdentityStrategy;

/// Which feed shape to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Text lines scraped from the rendered event page
    Page,
    /// Structured commentary API
    Api,
}

impl FromStr for FeedKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "api" => Ok(Self::Api),
            other => bail!("unknown feed kind '{other}' (expected page or api)"),
        }
    }
}

/// Harvester configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub output_dir: PathBuf,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub base_url: String,
    pub feed: FeedKind,
    pub api_url_template: String,
    pub api_pointer: String,
    pub identity_field: String,
    pub commentary_selectors: Vec<String>,
    pub max_write_failures: u32,
    pub capture: bool,
}

impl HarvestConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            output_dir: var("HARVESTER_OUTPUT_DIR")
                .unwrap_or_else(|| "cricket_scrape_output".to_string())
                .into(),
            poll_interval: Duration::from_secs(
                var("HARVESTER_POLL_INTERVAL_SECS")
                    .unwrap_or_else(|| "20".to_string())
                    .parse()
                    .context("HARVESTER_POLL_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            request_timeout: Duration::from_secs(
                var("HARVESTER_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|| "20".to_string())
                    .parse()
                    .context("HARVESTER_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            base_url: var("HARVESTER_BASE_URL")
                .unwrap_or_else(|| cricinfo_client::BASE_URL.to_string()),
            feed: var("HARVESTER_FEED")
                .unwrap_or_else(|| "page".to_string())
                .parse()
                .context("HARVESTER_FEED must be page or api")?,
            api_url_template: var("HARVESTER_API_URL_TEMPLATE")
                .unwrap_or_else(|| cricinfo_client::COMMENTS_API_TEMPLATE.to_string()),
            api_pointer: var("HARVESTER_API_POINTER").unwrap_or_else(|| "/comments".to_string()),
            identity_field: var("HARVESTER_IDENTITY_FIELD").unwrap_or_else(|| "id".to_string()),
            commentary_selectors: var("HARVESTER_COMMENTARY_SELECTORS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_else(|| {
                    cricinfo_client::DEFAULT_COMMENTARY_SELECTORS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            max_write_failures: var("HARVESTER_MAX_WRITE_FAILURES")
                .unwrap_or_else(|| "2".to_string())
                .parse()
                .context("HARVESTER_MAX_WRITE_FAILURES must be a non-negative number")?,
            capture: var("HARVESTER_CAPTURE")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
        })
    }

    /// Identity rule matching the configured feed.
    pub fn identity_strategy(&self) -> IdentityStrategy {
        match self.feed {
            FeedKind::Page => IdentityStrategy::text(),
            FeedKind::Api => IdentityStrategy::sequence(self.identity_field.clone()),
        }
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            poll_interval: self.poll_interval,
            max_write_failures: self.max_write_failures,
        }
    }
}
