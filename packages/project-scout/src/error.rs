//! Typed errors for the discovery pipeline.
//!
//! Per-URL problems are values ([`ErrorKind`] wrapped in a [`Failure`]) that
//! end up in a run's failure ledger. Only export and configuration errors
//! are returned to the caller as `Err`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a single URL was dropped from a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection failure, DNS failure or timeout
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with something other than 200
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Malformed HTML or a missing required element
    #[error("parse error: {0}")]
    Parse(String),

    /// The scorer could not produce a summary
    #[error("classification error: {0}")]
    Classification(String),

    /// A mandatory field was missing before standardization
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Input was not an absolute http(s) URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The run deadline passed or the run was cancelled
    #[error("cancelled before completion")]
    Cancelled,
}

impl ErrorKind {
    /// Short machine-friendly name, used in logs and the CLI ledger.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Network(_) => "NetworkError",
            ErrorKind::HttpStatus(_) => "HttpStatusError",
            ErrorKind::Parse(_) => "ParseError",
            ErrorKind::Classification(_) => "ClassificationError",
            ErrorKind::Precondition(_) => "PreconditionError",
            ErrorKind::InvalidUrl(_) => "InvalidUrl",
            ErrorKind::Cancelled => "Cancelled",
        }
    }
}

/// Pipeline stage at which a URL was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    FetchText,
    Score,
    FetchHtml,
    Extract,
    Standardize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Ingest => "ingest",
            Stage::FetchText => "fetch_text",
            Stage::Score => "score",
            Stage::FetchHtml => "fetch_html",
            Stage::Extract => "extract",
            Stage::Standardize => "standardize",
        };
        f.write_str(s)
    }
}

/// One entry of a run's failure ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub url: String,
    pub stage: Stage,
    pub kind: ErrorKind,
}

impl Failure {
    pub fn new(url: impl Into<String>, stage: Stage, kind: ErrorKind) -> Self {
        Self {
            url: url.into(),
            stage,
            kind,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.url, self.stage, self.kind)
    }
}

/// Errors that can occur while writing records to a sink.
///
/// These are fatal to the export step of a run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to write, so no header row can be derived
    #[error("no records to export")]
    EmptyRecords,

    /// Sink could not be opened, written or renamed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Invalid pipeline configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors reading the `Source URL` column from an uploaded file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Result type alias for per-URL operations.
pub type UrlResult<T> = std::result::Result<T, ErrorKind>;
