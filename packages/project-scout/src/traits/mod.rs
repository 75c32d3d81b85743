//! Core trait abstractions.
//!
//! - [`fetcher::Fetcher`] - page retrieval (HTTP, mocks)
//! - [`scorer::Scorer`] - relevance classifier
//! - [`labeler::Labeler`] - secondary attribute prediction
//! - [`exporter::Exporter`] - record sinks

pub mod exporter;
pub mod fetcher;
pub mod labeler;
pub mod scorer;
