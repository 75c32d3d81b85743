//! Labeler trait for the secondary attribute prediction.
//!
//! The labeler fills `bert_predicted_label`, an attribute mapping stored
//! verbatim beside the canonical fields. It is independent of the
//! [`Scorer`](super::scorer::Scorer) used for ranking.

use crate::types::metadata::Attributes;

pub trait Labeler: Send + Sync {
    /// Predict attribute values for the record built from `url`.
    ///
    /// The result must not depend on the order in which records are
    /// labeled; `url` is the stable per-record key.
    fn label(&self, url: &str, description: &str) -> Attributes;

    /// Get the labeler name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
