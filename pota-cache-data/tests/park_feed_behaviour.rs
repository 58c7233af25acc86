//! Behavioural coverage for the park feed freshness window.

use camino::Utf8PathBuf;
use chrono::{TimeDelta, Utc};
use pota_cache_core::ParkRecord;
use pota_cache_data::test_support::{StubParkFeedSource, feed_csv};
use pota_cache_data::{FailureClass, FeedCache, ParkFeedClient, ParkFeedError};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;
use tokio::runtime::Builder;

type FeedResult = Result<Vec<ParkRecord>, ParkFeedError>;

fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build Tokio runtime")
        .block_on(future)
}

fn cached_park() -> ParkRecord {
    ParkRecord::new("US-0042", "Cached Park", true, 1.0, 2.0)
}

struct FeedWorld {
    _dir: TempDir,
    cache: FeedCache,
    client: RefCell<Option<ParkFeedClient<StubParkFeedSource>>>,
    result: RefCell<Option<FeedResult>>,
}

#[fixture]
fn world() -> FeedWorld {
    let dir = match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temporary directory: {err}"),
    };
    let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temporary directory {path:?} is not UTF-8"));
    FeedWorld {
        cache: FeedCache::new(path),
        _dir: dir,
        client: RefCell::new(None),
        result: RefCell::new(None),
    }
}

fn install(world: &FeedWorld, source: StubParkFeedSource) {
    *world.client.borrow_mut() = Some(ParkFeedClient::new(source, world.cache.clone()));
}

fn request(world: &FeedWorld, force: bool) {
    let guard = world.client.borrow();
    let client = guard.as_ref().expect("client must be initialised");
    *world.result.borrow_mut() = Some(block_on(client.get_current(force)));
}

fn parks(world: &FeedWorld) -> Vec<ParkRecord> {
    match world.result.borrow().as_ref() {
        Some(Ok(parks)) => parks.clone(),
        other => panic!("expected park list, got {other:?}"),
    }
}

fn calls(world: &FeedWorld) -> usize {
    world
        .client
        .borrow()
        .as_ref()
        .map_or(0, |client| client.source().calls())
}

// --- Given steps ---

#[given("a park feed that lists Test Park")]
fn feed_lists_test_park(#[from(world)] world: &FeedWorld) {
    let csv = feed_csv(&[("US-5678", "Test Park", "1", "45.0", "-122.0")]);
    install(world, StubParkFeedSource::with_csv(csv));
}

#[given("a park feed that is unreachable")]
fn feed_unreachable(#[from(world)] world: &FeedWorld) {
    install(
        world,
        StubParkFeedSource::with_failure(FailureClass::UpstreamUnavailable),
    );
}

#[given("a park feed that serves a maintenance page")]
fn feed_serves_html(#[from(world)] world: &FeedWorld) {
    install(
        world,
        StubParkFeedSource::with_csv("<html><body>Down for maintenance</body></html>"),
    );
}

#[given("a local copy fetched 10 minutes ago")]
fn recent_copy(#[from(world)] world: &FeedWorld) {
    world
        .cache
        .store(&[cached_park()], Utc::now() - TimeDelta::minutes(10));
}

#[given("a local copy fetched 2 hours ago")]
fn stale_copy(#[from(world)] world: &FeedWorld) {
    world
        .cache
        .store(&[cached_park()], Utc::now() - TimeDelta::hours(2));
}

// --- When steps ---

#[when("the current park list is requested")]
fn request_current(#[from(world)] world: &FeedWorld) {
    request(world, false);
}

#[when("a forced reload is requested")]
fn request_forced(#[from(world)] world: &FeedWorld) {
    request(world, true);
}

// --- Then steps ---

#[then("the local copy is returned")]
fn local_copy_returned(#[from(world)] world: &FeedWorld) {
    assert_eq!(parks(world), vec![cached_park()]);
}

#[then("Test Park is returned")]
fn test_park_returned(#[from(world)] world: &FeedWorld) {
    let parks = parks(world);
    assert_eq!(parks.len(), 1);
    assert_eq!(parks[0].reference, "US-5678");
    assert_eq!(parks[0].name, "Test Park");
}

#[then("the feed was not contacted")]
fn feed_not_contacted(#[from(world)] world: &FeedWorld) {
    assert_eq!(calls(world), 0);
}

#[then("the feed was contacted once")]
fn feed_contacted_once(#[from(world)] world: &FeedWorld) {
    assert_eq!(calls(world), 1);
}

#[then("an upstream unavailable error is returned")]
fn unavailable_error(#[from(world)] world: &FeedWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref() {
        Some(Err(err)) => assert_eq!(err.class(), FailureClass::UpstreamUnavailable),
        other => panic!("expected an error, got {other:?}"),
    }
}

#[then("the local copy is still stale")]
fn local_copy_still_stale(#[from(world)] world: &FeedWorld) {
    assert_eq!(world.cache.load(), Some(vec![cached_park()]));
    assert!(!world.cache.is_fresh(Utc::now(), TimeDelta::hours(1)));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/park_feed.feature", name = $title)]
        fn $fn_name(world: FeedWorld) {
            let _ = world;
        }
    };
}

register_scenario!(answering_from_fresh_copy, "answering from a fresh local copy");
register_scenario!(refetching_stale_copy, "refetching a stale local copy");
register_scenario!(
    forcing_reload_past_fresh_copy,
    "forcing a reload past a fresh local copy"
);
register_scenario!(
    surviving_outage_with_copy,
    "surviving a feed outage with a local copy"
);
register_scenario!(
    reporting_outage_without_copy,
    "reporting a feed outage without a local copy"
);
register_scenario!(
    keeping_copy_over_maintenance_page,
    "keeping the local copy over a maintenance page"
);
