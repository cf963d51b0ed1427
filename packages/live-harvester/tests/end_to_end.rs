//! Integration tests for full harvesting runs.
//!
//! These drive the scheduler through discovery, selection and polling with
//! mock collaborators:
//! 1. Classify and persist the discovery snapshot
//! 2. Pick the live match
//! 3. Poll, dedup and append
//! 4. Stop on cancellation or an unwritable store

use std::time::Duration;

use live_harvester::{
    discovery::MockDiscoverer, samplers::MockSampler, select_event, Category, DiscoveredEvent,
    HarvestError, Harvester, Identity, IdentityStrategy, JsonFileStore, MemoryStore, RawEvent,
    RawRecord, RecordStore, SchedulerConfig, StopReason,
};
use tokio_util::sync::CancellationToken;
use url::Url;

fn base_url() -> Url {
    Url::parse("https://www.espncricinfo.com").unwrap()
}

/// IND vs AUS is live, ENG vs PAK finished, one fixture still to come.
fn scoreboard() -> Vec<RawEvent> {
    vec![
        RawEvent::new(
            "IND vs AUS",
            "Live",
            "/series/border-gavaskar-1001/ind-vs-aus-1st-test-2001/live-cricket-score",
        ),
        RawEvent::new(
            "ENG vs PAK",
            "PAK won by 5 wickets",
            "/series/pak-in-eng-1002/eng-vs-pak-2nd-odi-2002/full-scorecard",
        ),
        RawEvent::new(
            "NZ vs SA",
            "Tomorrow, 10:00 AM",
            "/series/sa-in-nz-1003/nz-vs-sa-1st-t20i-2003/preview",
        ),
    ]
}

/// One live match trailing, one finished.
fn two_matches() -> Vec<RawEvent> {
    vec![
        RawEvent::new("IND vs AUS", "Live, IND trail by 20 runs", "/match/1"),
        RawEvent::new("ENG vs PAK", "ENG won by 5 wickets", "/match/2"),
    ]
}

fn titles(events: &[DiscoveredEvent]) -> Vec<String> {
    events.iter().map(|e| e.title.clone()).collect()
}

fn fast() -> SchedulerConfig {
    SchedulerConfig {
        poll_interval: Duration::from_millis(1),
        max_write_failures: 2,
    }
}

fn texts(store: &MemoryStore) -> Vec<String> {
    store
        .records()
        .iter()
        .map(|r| r.payload["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_live_match_is_tracked_and_deduplicated() {
    let cancel = CancellationToken::new();
    let sampler = MockSampler::new()
        .with_label("India v Australia, 1st Test")
        .with_texts(&["a", "b"])
        .with_texts(&["b", "c"])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        sampler,
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&cancel).await;

    assert_eq!(summary.reason, StopReason::Cancelled);
    let event = summary.event.as_ref().unwrap();
    assert_eq!(event.title, "IND vs AUS");
    assert_eq!(event.id, "2001");
    assert_eq!(event.category, Category::Live);
    assert_eq!(summary.label.as_deref(), Some("India v Australia, 1st Test"));
    assert_eq!(summary.stats.cycles, 2);
    assert_eq!(summary.stats.appended, 3);

    let store = harvester.store();
    assert_eq!(texts(store), vec!["a", "b", "c"]);
    assert!(store
        .records()
        .iter()
        .all(|r| r.event_label == "India v Australia, 1st Test"));

    let discovery = store.discovery().unwrap();
    assert_eq!(discovery.live.len(), 1);
    assert_eq!(discovery.upcoming.len(), 1);
    assert_eq!(discovery.completed.len(), 1);
    assert_eq!(discovery.completed[0].title, "ENG vs PAK");

    assert!(harvester.sampler().is_closed());
    assert!(summary.into_result().is_ok());
}

#[tokio::test]
async fn test_two_match_run_stores_each_line_once() {
    let cancel = CancellationToken::new();
    let sampler = MockSampler::new()
        .with_texts(&["a", "b"])
        .with_texts(&["b", "c"])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(two_matches()),
        sampler,
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&cancel).await;

    let discovery = harvester.store().discovery().unwrap();
    assert_eq!(titles(&discovery.live), vec!["IND vs AUS"]);
    assert!(discovery.upcoming.is_empty());
    assert_eq!(titles(&discovery.completed), vec!["ENG vs PAK"]);

    let event = summary.event.unwrap();
    assert_eq!(event.title, "IND vs AUS");
    assert_eq!(event.id, "1");
    assert_eq!(event.url, "https://www.espncricinfo.com/match/1");

    assert_eq!(texts(harvester.store()), vec!["a", "b", "c"]);
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert!(harvester.sampler().is_closed());
}

#[tokio::test]
async fn test_two_match_seen_set_after_each_cycle() {
    let mut harvester = Harvester::new(
        MockDiscoverer::new(two_matches()),
        MockSampler::new().with_texts(&["a", "b"]).with_texts(&["b", "c"]),
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let classification = harvester.discover().await;
    assert_eq!(classification.live.len(), 1);
    assert_eq!(classification.completed.len(), 1);
    assert!(classification.upcoming.is_empty());

    let event = select_event(&classification).unwrap().clone();
    assert_eq!(event.title, "IND vs AUS");
    let mut session = harvester.begin(event).await;
    assert!(session.seen().is_empty());

    harvester.poll_once(&mut session).await.unwrap();
    assert_eq!(session.seen().len(), 2);

    let second = harvester.poll_once(&mut session).await.unwrap();
    assert_eq!(second.appended, 1);
    assert_eq!(session.seen().len(), 3);
    for text in ["a", "b", "c"] {
        assert!(session.seen().contains(&Identity::from(text)));
    }
    assert_eq!(harvester.store().records().len(), 3);
}

#[tokio::test]
async fn test_completed_match_is_fallback() {
    let cancel = CancellationToken::new();
    let events = scoreboard().into_iter().skip(1).collect();
    let sampler = MockSampler::new()
        .with_texts(&["PAK won by 5 wickets"])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(events),
        sampler,
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&cancel).await;
    assert_eq!(summary.event.unwrap().title, "ENG vs PAK");
    assert_eq!(texts(harvester.store()), vec!["PAK won by 5 wickets"]);
}

#[tokio::test]
async fn test_only_upcoming_means_nothing_to_track() {
    let events = scoreboard().into_iter().skip(2).collect();
    let mut harvester = Harvester::new(
        MockDiscoverer::new(events),
        MockSampler::new().with_texts(&["a"]),
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&CancellationToken::new()).await;

    assert_eq!(summary.reason, StopReason::NoTrackableEvent);
    assert!(summary.event.is_none());
    assert_eq!(harvester.sampler().sample_calls(), 0);
    assert!(harvester.store().records().is_empty());
    assert_eq!(harvester.store().discovery().unwrap().upcoming.len(), 1);
    assert!(matches!(
        summary.into_result(),
        Err(HarvestError::NoTrackableEvent)
    ));
}

#[tokio::test]
async fn test_discovery_failure_degrades_to_empty() {
    let mut harvester = Harvester::new(
        MockDiscoverer::failing(),
        MockSampler::new(),
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    );

    let summary = harvester.run(&CancellationToken::new()).await;

    assert_eq!(summary.reason, StopReason::NoTrackableEvent);
    assert_eq!(harvester.discoverer().call_count(), 1);
    assert!(harvester.store().discovery().unwrap().is_empty());
}

#[tokio::test]
async fn test_sample_failure_skips_cycle() {
    let cancel = CancellationToken::new();
    let sampler = MockSampler::new()
        .with_failure()
        .with_texts(&["a"])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        sampler,
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&cancel).await;

    assert_eq!(summary.stats.cycles, 2);
    assert_eq!(summary.stats.sample_failures, 1);
    assert_eq!(texts(harvester.store()), vec!["a"]);
}

#[tokio::test]
async fn test_unwritable_store_stops_polling() {
    let store = MemoryStore::new();
    store.fail_all_appends();

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        MockSampler::new().with_texts(&["a"]),
        store,
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&CancellationToken::new()).await;

    assert_eq!(summary.reason, StopReason::StoreUnwritable { failures: 2 });
    assert_eq!(summary.stats.write_failures, 2);
    assert_eq!(harvester.store().append_attempts(), 2);
    assert!(harvester.sampler().is_closed());
    assert!(matches!(
        summary.into_result(),
        Err(HarvestError::StoreUnwritable { failures: 2 })
    ));
}

#[tokio::test]
async fn test_transient_write_failure_is_retried() {
    let cancel = CancellationToken::new();
    let store = MemoryStore::new();
    store.fail_next_appends(1);
    let sampler = MockSampler::new()
        .with_texts(&["a"])
        .with_texts(&["a", "b"])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        sampler,
        store,
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());

    let summary = harvester.run(&cancel).await;

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.stats.write_failures, 1);
    assert_eq!(texts(harvester.store()), vec!["a", "b"]);
}

#[tokio::test]
async fn test_already_cancelled_run_never_samples() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        MockSampler::new().with_texts(&["a"]),
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    );

    let summary = harvester.run(&cancel).await;

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.stats.cycles, 0);
    assert_eq!(harvester.sampler().sample_calls(), 0);
    assert!(harvester.sampler().is_closed());
}

#[tokio::test]
async fn test_cancel_interrupts_wait() {
    let cancel = CancellationToken::new();
    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        MockSampler::new().with_texts(&["a"]),
        MemoryStore::new(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(SchedulerConfig {
        poll_interval: Duration::from_secs(3600),
        max_write_failures: 2,
    });

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let summary = tokio::time::timeout(Duration::from_secs(10), harvester.run(&cancel))
        .await
        .expect("run should stop promptly once cancelled");

    assert_eq!(summary.reason, StopReason::Cancelled);
    assert_eq!(summary.stats.cycles, 1);
    assert_eq!(texts(harvester.store()), vec!["a"]);
}

#[tokio::test]
async fn test_structured_feed_uses_sequence_identity() {
    let cancel = CancellationToken::new();
    let ball = |id: u64, text: &str| {
        RawRecord::default()
            .with_field("id", id)
            .with_field("title", text)
    };
    let sampler = MockSampler::new()
        .with_snapshot(vec![ball(1, "Starc to Rohit, no run"), ball(2, "Starc to Rohit, FOUR")])
        // Ball 2 re-worded by the source; still the same delivery.
        .with_snapshot(vec![ball(2, "Starc to Rohit, FOUR, cover drive"), ball(3, "Starc to Gill, 1 run")])
        .cancel_when_done(cancel.clone());

    let mut harvester = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        sampler,
        MemoryStore::new(),
        IdentityStrategy::sequence("id"),
        base_url(),
    )
    .with_config(fast());

    harvester.run(&cancel).await;

    let records = harvester.store().records();
    let ids: Vec<u64> = records.iter().map(|r| r.payload["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(records[1].payload["title"], "Starc to Rohit, FOUR");
}

#[tokio::test]
async fn test_restart_resumes_from_persisted_log() {
    let dir = tempfile::tempdir().unwrap();

    let cancel = CancellationToken::new();
    let mut first = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        MockSampler::new()
            .with_texts(&["a", "b"])
            .cancel_when_done(cancel.clone()),
        JsonFileStore::open(dir.path()).await.unwrap(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());
    first.run(&cancel).await;

    let cancel = CancellationToken::new();
    let mut second = Harvester::new(
        MockDiscoverer::new(scoreboard()),
        MockSampler::new()
            .with_texts(&["a", "b", "c"])
            .cancel_when_done(cancel.clone()),
        JsonFileStore::open(dir.path()).await.unwrap(),
        IdentityStrategy::text(),
        base_url(),
    )
    .with_config(fast());
    let summary = second.run(&cancel).await;

    assert_eq!(summary.stats.appended, 1);
    let log = second.store().load().await.unwrap();
    let logged: Vec<_> = log.iter().map(|r| r.payload["text"].clone()).collect();
    assert_eq!(logged, vec!["a", "b", "c"]);
}
