//! Scorer backends and input clipping.
//!
//! - [`KeywordScorer`] - in-process heuristic, no model
//! - [`HttpScorer`] - hosted text-classification endpoint

pub mod http;
pub mod keyword;

pub use http::HttpScorer;
pub use keyword::KeywordScorer;

use crate::error::ErrorKind;
use crate::traits::scorer::Scorer;
use crate::types::score::Summary;

/// Keep the first `max_tokens` whitespace-separated tokens of `text`.
///
/// Tokens are re-joined with single spaces. Text already under the cap is
/// returned with its whitespace normalized the same way.
pub fn clip_to_tokens(text: &str, max_tokens: usize) -> String {
    text.split_whitespace()
        .take(max_tokens)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clip `text` to the scorer's input cap and summarize it.
///
/// Over-length input is clipped, never rejected. Blank input is a
/// classification failure since there is nothing to classify.
pub async fn score_text<S: Scorer + ?Sized>(scorer: &S, text: &str) -> Result<Summary, ErrorKind> {
    score_text_capped(scorer, text, scorer.max_input_tokens()).await
}

/// Like [`score_text`], but never sends more than `max_tokens` tokens even
/// when the scorer accepts more.
pub async fn score_text_capped<S: Scorer + ?Sized>(
    scorer: &S,
    text: &str,
    max_tokens: usize,
) -> Result<Summary, ErrorKind> {
    let clipped = clip_to_tokens(text, max_tokens.min(scorer.max_input_tokens()));
    if clipped.is_empty() {
        return Err(ErrorKind::Classification("no text to classify".to_string()));
    }
    scorer.summarize(&clipped).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockScorer;

    #[test]
    fn test_clip_to_tokens() {
        assert_eq!(clip_to_tokens("a b  c\n d", 3), "a b c");
        assert_eq!(clip_to_tokens("a b", 10), "a b");
        assert_eq!(clip_to_tokens("   ", 10), "");
    }

    #[tokio::test]
    async fn test_score_text_clips_before_summarizing() {
        let scorer = MockScorer::new().with_max_input_tokens(4);
        let long_text = "construction ".repeat(1000);

        let summary = score_text(&scorer, &long_text).await.unwrap();

        assert_eq!(summary.as_str().split_whitespace().count(), 4);
        assert_eq!(scorer.inputs(), vec!["construction construction construction construction"]);
    }

    #[tokio::test]
    async fn test_capped_uses_smaller_limit() {
        let scorer = MockScorer::new().with_max_input_tokens(5);

        score_text_capped(&scorer, "one two three four five six seven", 3)
            .await
            .unwrap();
        score_text_capped(&scorer, "one two three four five six seven", 100)
            .await
            .unwrap();

        assert_eq!(
            scorer.inputs(),
            vec!["one two three", "one two three four five"]
        );
    }

    #[tokio::test]
    async fn test_score_text_rejects_blank_input() {
        let scorer = MockScorer::new();
        let result = score_text(&scorer, "  \n ").await;
        assert!(matches!(result, Err(ErrorKind::Classification(_))));
        assert!(scorer.inputs().is_empty());
    }
}
