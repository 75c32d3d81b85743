//! Municipal Project Discovery Pipeline
//!
//! Finds, ranks and normalizes information about municipal construction and
//! infrastructure projects published on public web pages.
//!
//! Given candidate source URLs, a run fetches each page, estimates its
//! topical relevance, keeps the most relevant sources, extracts structured
//! metadata from them and emits records in a fixed canonical schema.
//!
//! # Usage
//!
//! ```rust,ignore
//! use project_scout::{CsvExporter, Pipeline, PipelineConfig};
//! use std::sync::Arc;
//!
//! let pipeline = Pipeline::builder()
//!     .config(PipelineConfig::new().with_top_k(10))
//!     .build()?;
//!
//! let report = pipeline
//!     .run_and_export(urls, Arc::new(CsvExporter::new("standardized_data.csv")))
//!     .await?;
//!
//! for failure in &report.result.failures {
//!     eprintln!("{failure}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Fetcher, Scorer, Labeler, Exporter)
//! - [`types`] - Records, results and configuration
//! - [`pipeline`] - Ranking, extraction, standardization and the orchestrator
//! - [`fetchers`] - HTTP fetcher
//! - [`scorers`] - Keyword and hosted-classifier scorers
//! - [`labelers`] - Rule-based and seeded attribute labelers
//! - [`exporters`] - CSV and JSON sinks
//! - [`input`] - Reading the `Source URL` column
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod exporters;
pub mod fetchers;
pub mod input;
pub mod labelers;
pub mod pipeline;
pub mod scorers;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, ErrorKind, ExportError, Failure, InputError, Stage};
pub use traits::{exporter::Exporter, fetcher::Fetcher, labeler::Labeler, scorer::Scorer};
pub use types::{
    config::{FetchConfig, FieldDefaults, GeoPlaceholders, PipelineConfig},
    fetch::{FetchResult, FetchStatus},
    metadata::{Attributes, ExtractedMetadata},
    record::{CanonicalRecord, MapCoordinates, ProjectStatus},
    run::{RunOutcome, RunReport, RunResult, RunState},
    score::{ScoreEntry, Summary},
    source::SourceUrl,
};

// Re-export pipeline components
pub use pipeline::{
    keyword_score, rank, rank_entries, Extractor, Pipeline, PipelineBuilder, RunOptions,
    Standardizer, RELEVANCE_KEYWORDS,
};

// Re-export implementations
pub use exporters::{render_csv, CsvExporter, ExportSummary, JsonExporter};
pub use fetchers::HttpFetcher;
pub use input::read_source_urls;
pub use labelers::{RuleLabeler, SeededLabeler};
pub use scorers::{HttpScorer, KeywordScorer};
