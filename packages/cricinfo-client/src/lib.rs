//! Pure ESPNcricinfo client.
//!
//! A minimal HTTP client for the public ESPNcricinfo site. Fetches the live
//! scores page, match pages and the JSON commentary API, and parses them
//! with the selectors in [`parse`].
//!
//! # Example
//!
//! ```rust,ignore
//! use cricinfo_client::CricinfoClient;
//!
//! let client = CricinfoClient::new(std::time::Duration::from_secs(20))?;
//!
//! for card in client.live_scores().await? {
//!     println!("{} ({})", card.title, card.status);
//! }
//! ```

pub mod error;
pub mod parse;
pub mod types;

pub use error::{CricinfoError, Result};
pub use parse::{
    match_ids, normalize_text, parse_commentary_texts, parse_match_cards, parse_title,
    DEFAULT_COMMENTARY_SELECTORS,
};
pub use types::{MatchCard, MatchIds};

use std::time::Duration;
use url::Url;

pub const BASE_URL: &str = "https://www.espncricinfo.com";

const LIVE_SCORES_PATH: &str = "/live-cricket-score";

/// Ball-by-ball commentary endpoint. `{series_id}` and `{match_id}` are
/// substituted by [`comments_api_url`].
pub const COMMENTS_API_TEMPLATE: &str = "https://hs-consumer-api.espncricinfo.com/v1/pages/match/comments?lang=en&seriesId={series_id}&matchId={match_id}&sortDirection=DESC";

// The site serves a stripped page to obvious bots.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fill a commentary API template with match identifiers.
pub fn comments_api_url(template: &str, ids: MatchIds) -> String {
    template
        .replace("{series_id}", &ids.series_id.to_string())
        .replace("{match_id}", &ids.match_id.to_string())
}

#[derive(Debug, Clone)]
pub struct CricinfoClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CricinfoClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(BASE_URL)?,
        })
    }

    /// Point the client at a different site root (mirrors, tests).
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a possibly relative link against the base URL.
    pub fn resolve(&self, link: &str) -> Result<Url> {
        Ok(self.base_url.join(link)?)
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!(url = %url, "HTTP fetch starting");
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "HTTP request rejected");
            return Err(CricinfoError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp)
    }

    /// Fetch a page body as text.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let url = self.resolve(url)?;
        Ok(self.get(url.as_str()).await?.text().await?)
    }

    /// Fetch and decode a JSON document.
    pub async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let url = self.resolve(url)?;
        let body = self.get(url.as_str()).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Scrape the live scores page into match cards.
    pub async fn live_scores(&self) -> Result<Vec<MatchCard>> {
        tracing::info!(base = %self.base_url, "Fetching live scores");
        let html = self.fetch_html(LIVE_SCORES_PATH).await?;
        let cards = parse_match_cards(&html, &self.base_url)?;
        tracing::info!(count = cards.len(), "Fetched match cards");
        Ok(cards)
    }

    /// `<title>` of a page.
    pub async fn page_title(&self, url: &str) -> Result<Option<String>> {
        let html = self.fetch_html(url).await?;
        Ok(parse_title(&html))
    }

    /// Commentary lines currently rendered on a match page.
    pub async fn commentary_texts<S: AsRef<str>>(
        &self,
        url: &str,
        selectors: &[S],
    ) -> Result<Vec<String>> {
        let html = self.fetch_html(url).await?;
        parse_commentary_texts(&html, selectors)
    }
}
