//! Pipeline stages and the orchestrator that composes them.
//!
//! - [`rank`] - keyword scoring and top-K selection
//! - [`extract`] - title, description and JSON-LD attributes from HTML
//! - [`standardize`] - mapping onto the canonical schema
//! - [`orchestrator`] - the end-to-end run

pub mod extract;
pub mod orchestrator;
pub mod rank;
pub mod standardize;

pub use extract::Extractor;
pub use orchestrator::{Pipeline, PipelineBuilder, RunOptions};
pub use rank::{keyword_score, rank, rank_entries, RELEVANCE_KEYWORDS};
pub use standardize::Standardizer;
