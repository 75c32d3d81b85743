//! Pipeline wiring for the drivers.
//!
//! Every driver (HTTP server, CLI, scheduler) builds its pipeline here so the
//! collaborator choice depends on configuration only.

use anyhow::{Context, Result};
use project_scout::{HttpScorer, Pipeline, SeededLabeler};
use std::sync::Arc;

use crate::config::Config;

/// Build the pipeline described by `config`.
///
/// - `scorer_url` set: hosted classifier, otherwise the keyword heuristic.
///   The classifier shares the fetch timeout.
/// - `labeler_seed` set: seeded stochastic labeler, otherwise the rule labeler
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config.pipeline_config());

    if let Some(url) = &config.scorer_url {
        let mut scorer = HttpScorer::new(url.clone())
            .context("Failed to create hosted scorer")?
            .with_timeout(config.fetch_timeout);
        if let Some(key) = &config.scorer_api_key {
            scorer = scorer.with_api_key(key.clone());
        }
        tracing::info!(endpoint = %url, "Using hosted classification scorer");
        builder = builder.scorer(Arc::new(scorer));
    }

    if let Some(seed) = config.labeler_seed {
        tracing::warn!(seed, "Seeded random labeler enabled; predicted labels are synthetic");
        builder = builder.labeler(Arc::new(SeededLabeler::new(seed)));
    }

    builder.build().context("Invalid pipeline configuration")
}
