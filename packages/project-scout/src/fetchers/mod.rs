//! Fetcher implementations.
//!
//! - [`HttpFetcher`] - reqwest-based static HTML fetching
//!
//! For tests, see [`MockFetcher`](crate::testing::MockFetcher).

pub mod http;

pub use http::{visible_text, HttpFetcher};
