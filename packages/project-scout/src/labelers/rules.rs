//! Deterministic rule-based labeler.

use regex::Regex;
use serde_json::{json, Value};

use crate::traits::labeler::Labeler;
use crate::types::config::FieldDefaults;
use crate::types::metadata::Attributes;

/// Keyword rules over the description, falling back to the defaults table.
///
/// The same description always produces the same labels.
pub struct RuleLabeler {
    defaults: FieldDefaults,
    budget: Regex,
}

impl Default for RuleLabeler {
    fn default() -> Self {
        Self::new(FieldDefaults::default())
    }
}

impl RuleLabeler {
    pub fn new(defaults: FieldDefaults) -> Self {
        Self {
            defaults,
            budget: Regex::new(r"(?i)\$\s?(\d[\d,]*(?:\.\d+)?)\s*(billion|million|thousand|[mk]\b)?")
                .expect("static regex"),
        }
    }

    fn status(&self, text: &str) -> String {
        if contains_any(text, &["closed", "completed", "complete"]) {
            "Closed".to_string()
        } else if contains_any(text, &["open", "accepting bids", "bids due", "underway"]) {
            "Open".to_string()
        } else {
            self.defaults.status.to_string()
        }
    }

    fn stages(&self, text: &str) -> String {
        if contains_any(text, &["under construction", "underway", "in progress", "execution"]) {
            "Execution".to_string()
        } else if contains_any(text, &["planning", "proposed", "design phase", "feasibility"]) {
            "Planning".to_string()
        } else {
            self.defaults.stages.clone()
        }
    }

    fn procurement_method(&self, text: &str) -> String {
        if contains_any(text, &["design-build", "design build", "design and build"]) {
            "Design and Build".to_string()
        } else if contains_any(text, &["request for proposal", "rfp"]) {
            "Request for Proposal".to_string()
        } else {
            self.defaults.procurement_method.clone()
        }
    }

    fn buyer(&self, text: &str) -> String {
        if contains_any(text, &["city of", "county", "public works", "municipal", "district"]) {
            "Public".to_string()
        } else if contains_any(text, &["private", "developer"]) {
            "Private".to_string()
        } else {
            self.defaults.buyer.clone()
        }
    }

    fn subsector(&self, text: &str) -> String {
        if contains_any(
            text,
            &["infrastructure", "road", "street", "bridge", "water", "sewer", "pipeline"],
        ) {
            "Infrastructure Development".to_string()
        } else if contains_any(text, &["building", "housing", "facility", "library", "station"]) {
            "Building Construction".to_string()
        } else {
            self.defaults.subsector.clone()
        }
    }

    /// First dollar amount in the text, scaled by any magnitude suffix.
    fn budget(&self, text: &str) -> Option<f64> {
        let caps = self.budget.captures(text)?;
        let amount: f64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
        let scale = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(ref s) if s == "billion" => 1_000_000_000.0,
            Some(ref s) if s == "million" || s == "m" => 1_000_000.0,
            Some(ref s) if s == "thousand" || s == "k" => 1_000.0,
            _ => 1.0,
        };
        Some(amount * scale)
    }
}

impl Labeler for RuleLabeler {
    fn label(&self, _url: &str, description: &str) -> Attributes {
        let text = description.to_lowercase();
        let budget = self.budget(description);
        let currency = if budget.is_some() {
            "USD".to_string()
        } else {
            self.defaults.currency.clone()
        };

        let mut labels = Attributes::new();
        labels.insert("status".into(), Value::String(self.status(&text)));
        labels.insert("stages".into(), Value::String(self.stages(&text)));
        labels.insert(
            "procurementMethod".into(),
            Value::String(self.procurement_method(&text)),
        );
        labels.insert(
            "budget".into(),
            json!(budget.unwrap_or(self.defaults.budget)),
        );
        labels.insert("currency".into(), Value::String(currency));
        labels.insert("buyer".into(), Value::String(self.buyer(&text)));
        labels.insert("sector".into(), Value::String(self.defaults.sector.clone()));
        labels.insert("subsector".into(), Value::String(self.subsector(&text)));
        labels
    }

    fn name(&self) -> &str {
        "rules"
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
