//! Hosted text-classification scorer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ConfigError, ErrorKind};
use crate::traits::scorer::Scorer;
use crate::types::config::DEFAULT_MAX_INPUT_TOKENS;
use crate::types::score::Summary;

/// Classification request body.
#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    label: String,
}

/// The response shapes accepted from a classification endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Single(Prediction),
    List(Vec<Prediction>),
    Batched(Vec<Vec<Prediction>>),
}

impl ClassifyResponse {
    fn labels(self) -> Vec<String> {
        match self {
            ClassifyResponse::Single(p) => vec![p.label],
            ClassifyResponse::List(ps) => ps.into_iter().map(|p| p.label).collect(),
            ClassifyResponse::Batched(batches) => batches
                .into_iter()
                .flatten()
                .map(|p| p.label)
                .collect(),
        }
    }
}

/// Per-request timeout used until [`HttpScorer::with_timeout`] is called.
pub const DEFAULT_SCORER_TIMEOUT: Duration = Duration::from_secs(30);

/// Scorer that delegates to a hosted classification API.
///
/// Sends `{"inputs": text}` and accepts `{"label": ..}`, `[{"label": ..}]`
/// or `[[{"label": ..}]]`. The summary is the returned labels joined with
/// spaces. Any transport or decoding problem becomes a classification error.
pub struct HttpScorer {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
    max_input_tokens: usize,
}

impl HttpScorer {
    /// Create a scorer for an endpoint.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Invalid {
                field: "scorer",
                reason: e.to_string(),
            })?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            client,
            timeout: DEFAULT_SCORER_TIMEOUT,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
        })
    }

    /// Send a bearer token with each request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Give up on a classification request after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Change the input cap.
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn summarize(&self, text: &str) -> Result<Summary, ErrorKind> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&ClassifyRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "Classification request failed");
            ErrorKind::Classification(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorKind::Classification(format!(
                "classifier returned {status}: {body}"
            )));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ErrorKind::Classification(format!("unreadable response: {e}")))?;

        let labels = parsed.labels();
        if labels.is_empty() {
            return Err(ErrorKind::Classification("no labels returned".to_string()));
        }

        debug!(labels = ?labels, "Classification complete");
        Ok(Summary::new(labels.join(" ")))
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn name(&self) -> &str {
        "http"
    }
}
