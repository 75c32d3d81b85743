//! HTTP fetcher implementation.
//!
//! Static HTML only: no JavaScript rendering.

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{Html, Node};
use tracing::{debug, warn};

use crate::error::{ConfigError, ErrorKind};
use crate::traits::fetcher::Fetcher;
use crate::types::config::FetchConfig;
use crate::types::fetch::FetchResult;

/// Elements whose text never counts as visible content.
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Fetcher backed by a single shared `reqwest` client.
///
/// # Example
///
/// ```rust,ignore
/// use project_scout::fetchers::HttpFetcher;
///
/// let fetcher = HttpFetcher::new(&FetchConfig::default())?;
/// let result = fetcher.fetch_text("https://www.srcity.org/3212/Current-Projects").await;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured timeout, user agent and redirect limit.
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "fetch",
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }

    /// Use a custom HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET a URL; only HTTP 200 counts as success.
    async fn get(&self, url: &str) -> Result<String, ErrorKind> {
        debug!(url = %url, "HTTP fetch starting");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "HTTP request failed");
            network_error(&e)
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(url = %url, status = status.as_u16(), "Non-200 response");
            return Err(ErrorKind::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            warn!(url = %url, error = %e, "Failed to read response body");
            network_error(&e)
        })?;

        debug!(url = %url, bytes = body.len(), "HTTP fetch complete");
        Ok(body)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> FetchResult {
        match self.get(url).await {
            Ok(html) => FetchResult::ok(url, visible_text(&html)),
            Err(kind) => FetchResult::failed(url, kind),
        }
    }

    async fn fetch_html(&self, url: &str) -> FetchResult {
        match self.get(url).await {
            Ok(html) => FetchResult::ok(url, html),
            Err(kind) => FetchResult::failed(url, kind),
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn network_error(e: &reqwest::Error) -> ErrorKind {
    if e.is_timeout() {
        ErrorKind::Network(format!("timed out: {e}"))
    } else {
        ErrorKind::Network(e.to_string())
    }
}

/// Strip tags and return the document's visible text, whitespace-joined.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| INVISIBLE_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}
