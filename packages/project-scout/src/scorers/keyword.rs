//! Keyword heuristic scorer.

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::traits::scorer::Scorer;
use crate::types::config::DEFAULT_MAX_INPUT_TOKENS;
use crate::types::score::Summary;

/// Summarizes a page as its own lower-cased (clipped) text.
///
/// With this backend the ranker effectively counts relevance keywords in
/// the first `max_input_tokens` tokens of the page. No model is loaded.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    max_input_tokens: usize,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordScorer {
    pub fn new() -> Self {
        Self {
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        }
    }

    /// Change the input cap.
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }
}

#[async_trait]
impl Scorer for KeywordScorer {
    async fn summarize(&self, text: &str) -> Result<Summary, ErrorKind> {
        Ok(Summary::new(text.to_lowercase()))
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
