//! Scorer trait abstracting the relevance classifier.
//!
//! The pipeline depends only on this contract, never on a particular model.
//! A keyword heuristic, a hosted classification API or a local model can sit
//! behind it; swapping one for another changes score values and nothing else.
//!
//! # Usage
//!
//! ```rust,ignore
//! use project_scout::scorers::{score_text, KeywordScorer};
//!
//! let scorer = KeywordScorer::new();
//! let summary = score_text(&scorer, &page_text).await?;
//! assert!(summary.contains("construction"));
//! ```

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::types::config::DEFAULT_MAX_INPUT_TOKENS;
use crate::types::score::Summary;

#[async_trait]
pub trait Scorer: Send + Sync {
    /// Produce a summary (label, generated text, ...) for already-clipped text.
    ///
    /// An `Err` is the normal "no summary" outcome: the URL drops out of
    /// ranking and the reason lands in the failure ledger. It is never a
    /// run-level fault.
    async fn summarize(&self, text: &str) -> Result<Summary, ErrorKind>;

    /// Longest input, in whitespace tokens, this backend accepts.
    ///
    /// Longer text is clipped before `summarize` is called.
    fn max_input_tokens(&self) -> usize {
        DEFAULT_MAX_INPUT_TOKENS
    }

    /// Get the scorer name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
