//! Mapping extracted fields onto the canonical schema.

use std::sync::Arc;

use chrono::Local;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::labelers::RuleLabeler;
use crate::traits::labeler::Labeler;
use crate::types::config::{FieldDefaults, GeoPlaceholders};
use crate::types::metadata::Attributes;
use crate::types::record::{CanonicalRecord, ProjectStatus};

/// Builds canonical records.
///
/// Each attribute is taken from the page when present and usable, otherwise
/// from the [`FieldDefaults`] table. Geographic fields always come from the
/// [`GeoPlaceholders`].
#[derive(Clone)]
pub struct Standardizer {
    defaults: FieldDefaults,
    placeholders: GeoPlaceholders,
    labeler: Arc<dyn Labeler>,
}

impl Default for Standardizer {
    fn default() -> Self {
        let defaults = FieldDefaults::default();
        Self::new(
            defaults.clone(),
            GeoPlaceholders::default(),
            Arc::new(RuleLabeler::new(defaults)),
        )
    }
}

impl Standardizer {
    pub fn new(
        defaults: FieldDefaults,
        placeholders: GeoPlaceholders,
        labeler: Arc<dyn Labeler>,
    ) -> Self {
        Self {
            defaults,
            placeholders,
            labeler,
        }
    }

    /// Swap the labeler.
    pub fn with_labeler(mut self, labeler: Arc<dyn Labeler>) -> Self {
        self.labeler = labeler;
        self
    }

    pub fn defaults(&self) -> &FieldDefaults {
        &self.defaults
    }

    pub fn placeholders(&self) -> &GeoPlaceholders {
        &self.placeholders
    }

    pub fn labeler_name(&self) -> &str {
        self.labeler.name()
    }

    /// Produce a record. Every column is populated.
    ///
    /// `predicted_label` is stored as given; when `None` the labeler runs once
    /// over the description.
    pub fn standardize(
        &self,
        title: &str,
        description: &str,
        attributes: &Attributes,
        predicted_label: Option<Attributes>,
        url: &str,
    ) -> CanonicalRecord {
        let d = &self.defaults;
        let geo = &self.placeholders;

        let status = attributes
            .get("status")
            .and_then(Value::as_str)
            .and_then(ProjectStatus::parse)
            .unwrap_or(d.status);

        let budget = attributes
            .get("budget")
            .and_then(parse_budget)
            .unwrap_or(d.budget);

        let bert_predicted_label =
            predicted_label.unwrap_or_else(|| self.labeler.label(url, description));

        debug!(
            url = %url,
            provided = attributes.len(),
            labeler = self.labeler.name(),
            "Standardized record"
        );

        CanonicalRecord {
            aug_id: Uuid::new_v4(),
            country_name: geo.country_name.clone(),
            country_code: geo.country_code.clone(),
            map_coordinates: geo.map_coordinates.clone(),
            url: url.to_string(),
            region_name: geo.region_name.clone(),
            region_code: geo.region_code.clone(),
            title: title.to_string(),
            description: description.to_string(),
            status,
            stages: text_attribute(attributes, "stages", &d.stages),
            date: Local::now().date_naive(),
            procurement_method: text_attribute(
                attributes,
                "procurementMethod",
                &d.procurement_method,
            ),
            budget,
            currency: text_attribute(attributes, "currency", &d.currency),
            buyer: text_attribute(attributes, "buyer", &d.buyer),
            sector: text_attribute(attributes, "sector", &d.sector),
            subsector: text_attribute(attributes, "subsector", &d.subsector),
            bert_predicted_label,
        }
    }
}

/// A non-blank string attribute, else the default.
fn text_attribute(attributes: &Attributes, key: &str, default: &str) -> String {
    attributes
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Numbers pass through; strings have `$`, commas and spaces stripped.
fn parse_budget(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok().filter(|b| b.is_finite())
        }
        _ => None,
    }
}
