//! Live commentary harvester
//!
//! Lists current matches, picks one (live first, then the most recent
//! completed one) and appends its new commentary to the output directory
//! until Ctrl+C.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cricinfo_client::CricinfoClient;
use live_harvester::discovery::CricinfoDiscoverer;
use live_harvester::report::{self, ConsoleReport};
use live_harvester::samplers::{PageTextSampler, StructuredApiSampler};
use live_harvester::{
    Classification, DiscoveredEvent, FeedKind, FeedSampler, HarvestConfig, HarvestError,
    Harvester, HtmlSnapshotCapturer, JsonFileStore,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser)]
#[command(name = "harvester")]
#[command(about = "Follow a live match and store its commentary")]
struct Cli {
    /// Output directory (overrides HARVESTER_OUTPUT_DIR)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seconds between polls (overrides HARVESTER_POLL_INTERVAL_SECS)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Feed to sample: page or api (overrides HARVESTER_FEED)
    #[arg(long)]
    feed: Option<FeedKind>,

    /// Track the Nth listed match instead of the automatic choice
    #[arg(long, conflicts_with = "interactive")]
    pick: Option<usize>,

    /// Choose the match from a prompt
    #[arg(long)]
    interactive: bool,

    /// Save an HTML copy of the match page whenever commentary is stored
    #[arg(long)]
    capture: bool,

    /// Consecutive failed writes before giving up, 0 for never
    #[arg(long)]
    max_write_failures: Option<u32>,
}

impl Cli {
    fn apply(&self, config: &mut HarvestConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(secs) = self.interval {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(feed) = self.feed {
            config.feed = feed;
        }
        if self.capture {
            config.capture = true;
        }
        if let Some(max) = self.max_write_failures {
            config.max_write_failures = max;
        }
    }
}

/// Operator override of the automatic choice. Listing is numbered from 1.
fn choose_event(cli: &Cli, classification: &Classification) -> Result<Option<DiscoveredEvent>> {
    match cli.pick {
        Some(n) => match n.checked_sub(1).and_then(|i| classification.nth(i)) {
            Some(event) => Ok(Some(event.clone())),
            None => bail!("--pick {n} is out of range ({} listed)", classification.len()),
        },
        None => report::prompt_event(classification),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,live_harvester=debug,cricinfo_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let mut config = HarvestConfig::from_env()?;
    cli.apply(&mut config);

    tracing::info!(
        output_dir = %config.output_dir.display(),
        interval_secs = config.poll_interval.as_secs(),
        feed = ?config.feed,
        "Starting harvester"
    );

    let base_url = Url::parse(&config.base_url).context("HARVESTER_BASE_URL must be a valid URL")?;
    let client = CricinfoClient::new(config.request_timeout)
        .context("Failed to build HTTP client")?
        .with_base_url(base_url.clone());

    let sampler: Box<dyn FeedSampler> = match config.feed {
        FeedKind::Page => Box::new(PageTextSampler::new(
            client.clone(),
            config.commentary_selectors.clone(),
        )),
        FeedKind::Api => Box::new(StructuredApiSampler::new(
            client.clone(),
            config.api_url_template.clone(),
            config.api_pointer.clone(),
        )),
    };

    let store = JsonFileStore::open(&config.output_dir)
        .await
        .with_context(|| format!("Cannot use output directory {}", config.output_dir.display()))?;

    let mut harvester = Harvester::new(
        CricinfoDiscoverer::new(client.clone()),
        sampler,
        store,
        config.identity_strategy(),
        base_url,
    )
    .with_config(config.scheduler())
    .with_observer(Box::new(ConsoleReport));
    if config.capture {
        harvester = harvester.with_capturer(Box::new(HtmlSnapshotCapturer::new(
            client,
            config.output_dir.clone(),
        )));
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping after the current cycle");
            on_signal.cancel();
        }
    });

    let summary = if cli.pick.is_some() || cli.interactive {
        let classification = harvester.discover().await;
        let event = match choose_event(&cli, &classification) {
            Ok(Some(event)) => event,
            other => {
                harvester.shutdown().await;
                return match other {
                    Err(e) => Err(e),
                    _ => {
                        println!("No matches listed.");
                        Ok(())
                    }
                };
            }
        };
        harvester.track(event, &cancel).await
    } else {
        harvester.run(&cancel).await
    };

    report::print_summary(&summary);
    match summary.into_result() {
        Ok(_) | Err(HarvestError::NoTrackableEvent) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_harvester::{classify, RawEvent};

    fn listing() -> Classification {
        classify(
            vec![
                RawEvent::new("IND vs AUS", "Live", "/match/1"),
                RawEvent::new("ENG vs PAK", "ENG won by 5 wickets", "/match/2"),
            ],
            &Url::parse(cricinfo_client::BASE_URL).unwrap(),
        )
    }

    #[test]
    fn test_pick_counts_from_one() {
        let cli = Cli::parse_from(["harvester", "--pick", "2"]);
        let event = choose_event(&cli, &listing()).unwrap().unwrap();
        assert_eq!(event.title, "ENG vs PAK");
    }

    #[test]
    fn test_pick_out_of_range() {
        for n in ["0", "3"] {
            let cli = Cli::parse_from(["harvester", "--pick", n]);
            assert!(choose_event(&cli, &listing()).is_err());
        }
    }
}
