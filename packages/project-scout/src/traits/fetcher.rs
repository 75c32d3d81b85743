//! Fetcher trait for retrieving candidate pages.
//!
//! Two modes share one transport and one failure policy:
//! - `fetch_text` returns visible text with tags stripped, used for scoring
//! - `fetch_html` returns the raw document, used for extraction
//!
//! Implementations never return `Err` or panic past this boundary; every
//! failure is reported inside the [`FetchResult`].

use async_trait::async_trait;

use crate::types::fetch::FetchResult;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page and return its whitespace-joined visible text.
    async fn fetch_text(&self, url: &str) -> FetchResult;

    /// Fetch a page and return the raw HTML document.
    async fn fetch_html(&self, url: &str) -> FetchResult;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
