//! Configuration types for the pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::record::{MapCoordinates, ProjectStatus};

/// Default number of survivors kept after ranking.
pub const DEFAULT_TOP_K: usize = 10;

/// Default bound on in-flight fetches.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Token cap applied to text before it reaches a scorer.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 512;

/// Configuration for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum number of ranked survivors passed to extraction.
    ///
    /// Default: 10.
    pub top_k: usize,

    /// Maximum concurrent fetch/score (and extract) tasks.
    ///
    /// Unbounded concurrency against third-party hosts is a politeness
    /// hazard, so this is always finite. Default: 8.
    pub concurrency: usize,

    /// HTTP transport settings.
    pub fetch: FetchConfig,

    /// Token cap applied to fetched text before scoring.
    pub max_input_tokens: usize,

    /// Optional deadline for the fetch-and-score stage.
    ///
    /// Outstanding fetch/score tasks are cancelled when it passes and surface
    /// as `Cancelled` failures. Extraction of the survivors is not bounded.
    #[serde(with = "optional_secs")]
    pub run_deadline: Option<Duration>,

    /// Fallback values for attributes a page does not declare.
    pub defaults: FieldDefaults,

    /// Fixed geographic values written into every record.
    pub placeholders: GeoPlaceholders,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            concurrency: DEFAULT_CONCURRENCY,
            fetch: FetchConfig::default(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            run_deadline: None,
            defaults: FieldDefaults::default(),
            placeholders: GeoPlaceholders::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of survivors.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the concurrency bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Cap the words any scorer sees per page.
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    /// Set the per-request timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch.timeout = timeout;
        self
    }

    /// Set a deadline for the whole run.
    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = Some(deadline);
        self
    }

    /// Replace the defaults table.
    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the geographic placeholders.
    pub fn with_placeholders(mut self, placeholders: GeoPlaceholders) -> Self {
        self.placeholders = placeholders;
        self
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Zero { field: "top_k" });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Zero {
                field: "concurrency",
            });
        }
        if self.max_input_tokens == 0 {
            return Err(ConfigError::Zero {
                field: "max_input_tokens",
            });
        }
        if self.fetch.timeout.is_zero() {
            return Err(ConfigError::Zero {
                field: "fetch.timeout",
            });
        }
        Ok(())
    }
}

/// HTTP transport settings shared by text and HTML fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout. Default: 30s.
    #[serde(with = "secs")]
    pub timeout: Duration,

    /// User-Agent header.
    pub user_agent: String,

    /// Redirects followed before giving up. Default: 5.
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "ProjectScout/0.1 (+municipal project discovery)".to_string(),
            max_redirects: 5,
        }
    }
}

/// The defaulting table used by the standardizer.
///
/// Every value is fixed; nothing here is drawn at random.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDefaults {
    pub status: ProjectStatus,
    pub stages: String,
    pub procurement_method: String,
    pub budget: f64,
    pub currency: String,
    pub buyer: String,
    pub sector: String,
    pub subsector: String,
}

impl Default for FieldDefaults {
    fn default() -> Self {
        Self {
            status: ProjectStatus::Unknown,
            stages: "Unknown".to_string(),
            procurement_method: "Unknown".to_string(),
            budget: 0.0,
            currency: "USD".to_string(),
            buyer: "Unknown".to_string(),
            sector: "Construction".to_string(),
            subsector: "Unknown".to_string(),
        }
    }
}

/// Constant geographic fields.
///
/// Not derived from the source page; there is no geocoding step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoPlaceholders {
    pub country_name: String,
    pub country_code: String,
    pub region_name: String,
    pub region_code: String,
    pub map_coordinates: MapCoordinates,
}

impl Default for GeoPlaceholders {
    fn default() -> Self {
        Self {
            country_name: "United States".to_string(),
            country_code: "USA".to_string(),
            region_name: "California".to_string(),
            region_code: "CA".to_string(),
            map_coordinates: MapCoordinates::point(-122.4, 37.8),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

mod optional_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
