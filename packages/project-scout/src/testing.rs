//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that drive the pipeline
//! without making real network or classifier calls.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::ErrorKind;
use crate::fetchers::visible_text;
use crate::traits::{fetcher::Fetcher, labeler::Labeler, scorer::Scorer};
use crate::types::config::DEFAULT_MAX_INPUT_TOKENS;
use crate::types::fetch::FetchResult;
use crate::types::metadata::Attributes;
use crate::types::score::Summary;

/// A mock fetcher for testing.
///
/// Serves predefined documents without making network requests. Unknown URLs
/// fail with `HttpStatus(404)`.
#[derive(Default)]
pub struct MockFetcher {
    /// Predefined visible text by URL
    texts: Arc<RwLock<HashMap<String, String>>>,

    /// Predefined raw HTML by URL
    html: Arc<RwLock<HashMap<String, String>>>,

    /// URLs whose text fetch fails
    text_failures: Arc<RwLock<HashMap<String, ErrorKind>>>,

    /// URLs whose HTML fetch fails
    html_failures: Arc<RwLock<HashMap<String, ErrorKind>>>,

    /// Per-URL latency
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Call tracking
    calls: Arc<RwLock<Vec<MockFetcherCall>>>,

    /// Requests currently being served
    in_flight: Arc<AtomicUsize>,

    /// Highest value `in_flight` has reached
    peak_in_flight: Arc<AtomicUsize>,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFetcherCall {
    Text { url: String },
    Html { url: String },
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an HTML document for both fetch modes.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();
        self.texts
            .write()
            .unwrap()
            .insert(url.clone(), visible_text(&html));
        self.html.write().unwrap().insert(url, html);
        self
    }

    /// Serve a fixed text body for `fetch_text` only.
    pub fn with_text(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.write().unwrap().insert(url.into(), text.into());
        self
    }

    /// Make `fetch_text` fail for a URL.
    pub fn fail_text(self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.text_failures.write().unwrap().insert(url.into(), kind);
        self
    }

    /// Make `fetch_html` fail for a URL.
    pub fn fail_html(self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.html_failures.write().unwrap().insert(url.into(), kind);
        self
    }

    /// Delay every response for a URL.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetcherCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of HTML fetches made.
    pub fn html_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockFetcherCall::Html { .. }))
            .count()
    }

    /// Most requests that were ever being served at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn wait(&self, url: &str) {
        let _serving = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn serve(
        url: &str,
        failures: &RwLock<HashMap<String, ErrorKind>>,
        bodies: &RwLock<HashMap<String, String>>,
    ) -> FetchResult {
        if let Some(kind) = failures.read().unwrap().get(url) {
            return FetchResult::failed(url, kind.clone());
        }
        match bodies.read().unwrap().get(url) {
            Some(body) => FetchResult::ok(url, body.clone()),
            None => FetchResult::failed(url, ErrorKind::HttpStatus(404)),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> FetchResult {
        self.calls.write().unwrap().push(MockFetcherCall::Text {
            url: url.to_string(),
        });
        self.wait(url).await;
        Self::serve(url, &self.text_failures, &self.texts)
    }

    async fn fetch_html(&self, url: &str) -> FetchResult {
        self.calls.write().unwrap().push(MockFetcherCall::Html {
            url: url.to_string(),
        });
        self.wait(url).await;
        Self::serve(url, &self.html_failures, &self.html)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Counts a request as in flight until dropped.
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A mock scorer for testing.
///
/// By default the summary is the input text itself, so the ranker counts
/// keywords in the (clipped) page text.
pub struct MockScorer {
    /// Predefined summaries by exact input text
    summaries: Arc<RwLock<HashMap<String, Summary>>>,

    /// Inputs containing any of these fragments fail
    fail_fragments: Arc<RwLock<Vec<String>>>,

    max_input_tokens: usize,

    /// Inputs received, in call order
    inputs: Arc<RwLock<Vec<String>>>,
}

impl Default for MockScorer {
    fn default() -> Self {
        Self {
            summaries: Default::default(),
            fail_fragments: Default::default(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            inputs: Default::default(),
        }
    }
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fixed summary for an exact input.
    pub fn with_summary(self, input: impl Into<String>, summary: impl Into<Summary>) -> Self {
        self.summaries
            .write()
            .unwrap()
            .insert(input.into(), summary.into());
        self
    }

    /// Fail any input that contains `fragment`.
    pub fn fail_on(self, fragment: impl Into<String>) -> Self {
        self.fail_fragments.write().unwrap().push(fragment.into());
        self
    }

    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    /// Inputs received so far.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.read().unwrap().clone()
    }
}

#[async_trait]
impl Scorer for MockScorer {
    async fn summarize(&self, text: &str) -> Result<Summary, ErrorKind> {
        self.inputs.write().unwrap().push(text.to_string());

        if self
            .fail_fragments
            .read()
            .unwrap()
            .iter()
            .any(|f| text.contains(f.as_str()))
        {
            return Err(ErrorKind::Classification("mock failure".to_string()));
        }

        Ok(self
            .summaries
            .read()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or_else(|| Summary::new(text)))
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock labeler returning one canned mapping.
#[derive(Default)]
pub struct MockLabeler {
    /// Descriptions received, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mapping every call returns.
    pub fn canned(&self) -> Attributes {
        let mut labels = Attributes::new();
        labels.insert("status".into(), json!("Open"));
        labels.insert("budget".into(), json!(1000.0));
        labels
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

impl Labeler for MockLabeler {
    fn label(&self, _url: &str, description: &str) -> Attributes {
        self.calls.write().unwrap().push(description.to_string());
        self.canned()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
