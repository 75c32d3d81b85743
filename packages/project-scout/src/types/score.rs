//! Scorer output and ranking entries.

use serde::{Deserialize, Serialize};

/// Opaque textual artifact produced by a [`Scorer`](crate::traits::scorer::Scorer).
///
/// Could be a label, a generated summary or the page text itself; the
/// pipeline only ever searches it for keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(String);

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring search.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl From<&str> for Summary {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Summary {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A scored candidate URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub url: String,
    pub summary: Summary,
    /// Number of relevance keywords found in the summary
    pub score: u32,
}

impl ScoreEntry {
    /// Build an entry, computing the keyword score from the summary.
    pub fn new(url: impl Into<String>, summary: impl Into<Summary>) -> Self {
        let summary = summary.into();
        let score = crate::pipeline::rank::keyword_score(&summary);
        Self {
            url: url.into(),
            summary,
            score,
        }
    }
}
