//! Test doubles for the upstream sources.
//!
//! The stubs return pre-configured responses without making HTTP requests
//! and count how often they were called. Responses can be swapped between
//! calls to script success-then-failure sequences.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pota_cache_core::OverpassDocument;

use crate::error::{FailureClass, UpstreamError};
use crate::overpass::OverpassSource;
use crate::park_feed::ParkFeedSource;

const STUB_OVERPASS_URL: &str = "http://overpass.test/api/interpreter";
const STUB_FEED_URL: &str = "http://feed.test/all_parks_ext.csv";

#[derive(Debug, Clone)]
enum StubResponse<T> {
    Value(T),
    Failure(FailureClass),
}

impl<T: Clone> StubResponse<T> {
    fn produce(&self, url: &str) -> Result<T, UpstreamError> {
        match self {
            Self::Value(value) => Ok(value.clone()),
            Self::Failure(FailureClass::UpstreamUnavailable) => Err(UpstreamError::Network {
                url: url.to_owned(),
                message: "connection refused".to_owned(),
            }),
            Self::Failure(FailureClass::MalformedUpstream) => Err(UpstreamError::Malformed {
                url: url.to_owned(),
                message: "expected value at line 1 column 1".to_owned(),
            }),
        }
    }
}

#[derive(Debug)]
struct Scripted<T> {
    response: Mutex<StubResponse<T>>,
    calls: AtomicUsize,
}

impl<T: Clone> Scripted<T> {
    fn new(response: StubResponse<T>) -> Self {
        Self {
            response: Mutex::new(response),
            calls: AtomicUsize::new(0),
        }
    }

    fn set(&self, response: StubResponse<T>) {
        *self.response.lock().unwrap_or_else(PoisonError::into_inner) = response;
    }

    fn call(&self, url: &str) -> Result<T, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .produce(url)
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Stub [`OverpassSource`] returning a fixed document or failure.
#[derive(Debug)]
pub struct StubOverpassSource {
    inner: Scripted<OverpassDocument>,
}

impl StubOverpassSource {
    /// Source answering with `document`.
    #[must_use]
    pub fn with_document(document: OverpassDocument) -> Self {
        Self {
            inner: Scripted::new(StubResponse::Value(document)),
        }
    }

    /// Source failing with an error of the given class.
    #[must_use]
    pub fn with_failure(class: FailureClass) -> Self {
        Self {
            inner: Scripted::new(StubResponse::Failure(class)),
        }
    }

    /// Answer subsequent calls with `document`.
    pub fn set_document(&self, document: OverpassDocument) {
        self.inner.set(StubResponse::Value(document));
    }

    /// Fail subsequent calls.
    pub fn set_failure(&self, class: FailureClass) {
        self.inner.set(StubResponse::Failure(class));
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl OverpassSource for StubOverpassSource {
    fn url(&self) -> &str {
        STUB_OVERPASS_URL
    }

    async fn fetch(&self) -> Result<OverpassDocument, UpstreamError> {
        self.inner.call(STUB_OVERPASS_URL)
    }
}

/// Stub [`ParkFeedSource`] returning fixed CSV text or failure.
#[derive(Debug)]
pub struct StubParkFeedSource {
    inner: Scripted<String>,
}

impl StubParkFeedSource {
    /// Source answering with `csv`.
    #[must_use]
    pub fn with_csv(csv: impl Into<String>) -> Self {
        Self {
            inner: Scripted::new(StubResponse::Value(csv.into())),
        }
    }

    /// Source failing with an error of the given class.
    #[must_use]
    pub fn with_failure(class: FailureClass) -> Self {
        Self {
            inner: Scripted::new(StubResponse::Failure(class)),
        }
    }

    /// Answer subsequent calls with `csv`.
    pub fn set_csv(&self, csv: impl Into<String>) {
        self.inner.set(StubResponse::Value(csv.into()));
    }

    /// Fail subsequent calls.
    pub fn set_failure(&self, class: FailureClass) {
        self.inner.set(StubResponse::Failure(class));
    }

    /// Number of fetches so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

#[async_trait]
impl ParkFeedSource for StubParkFeedSource {
    fn url(&self) -> &str {
        STUB_FEED_URL
    }

    async fn fetch_csv(&self) -> Result<String, UpstreamError> {
        self.inner.call(STUB_FEED_URL)
    }
}

/// CSV header matching the published park feed.
pub const FEED_HEADER: &str =
    "\"reference\",\"name\",\"active\",\"entityId\",\"locationDesc\",\"latitude\",\"longitude\",\"grid\"";

/// Build a feed body from `(reference, name, active, lat, lon)` rows.
#[must_use]
pub fn feed_csv(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let mut body = String::from(FEED_HEADER);
    body.push('\n');
    for (reference, name, active, lat, lon) in rows {
        body.push_str(&format!(
            "\"{reference}\",\"{name}\",\"{active}\",\"291\",\"US-OR\",\"{lat}\",\"{lon}\",\"CN85\"\n"
        ));
    }
    body
}
