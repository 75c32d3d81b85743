//! Metadata extraction from survivor HTML.
//!
//! - `title`: trimmed text of the first `<title>`; a missing element fails
//!   extraction for the page
//! - `description`: trimmed `content` of `<meta name="description">`; a
//!   missing tag yields `""`
//! - `attributes`: canonical attribute keys found in JSON-LD blocks

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::error::ErrorKind;
use crate::types::metadata::{Attributes, ExtractedMetadata};

/// Attribute keys the standardizer knows how to use.
pub const ATTRIBUTE_KEYS: [&str; 8] = [
    "status",
    "stages",
    "procurementMethod",
    "budget",
    "currency",
    "buyer",
    "sector",
    "subsector",
];

/// Pulls title, description and attribute hints out of an HTML document.
pub struct Extractor {
    title: Selector,
    meta: Selector,
    json_ld: Selector,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            title: Selector::parse("title").expect("static selector"),
            meta: Selector::parse("meta[name]").expect("static selector"),
            json_ld: Selector::parse(r#"script[type="application/ld+json"]"#)
                .expect("static selector"),
        }
    }

    /// Extract metadata from a document.
    ///
    /// Fails for empty input and for documents without a `<title>`.
    pub fn extract(&self, html: &str) -> Result<ExtractedMetadata, ErrorKind> {
        if html.trim().is_empty() {
            return Err(ErrorKind::Parse("empty document".to_string()));
        }

        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .ok_or_else(|| ErrorKind::Parse("missing <title> element".to_string()))?;

        let description = match self.description_tag(&document) {
            Some(tag) => tag
                .value()
                .attr("content")
                .map(|c| c.trim().to_string())
                .ok_or_else(|| {
                    ErrorKind::Parse("description meta tag has no content".to_string())
                })?,
            None => String::new(),
        };

        let attributes = self.json_ld_attributes(&document);

        Ok(ExtractedMetadata {
            title: Some(title),
            description: Some(description),
            attributes,
        })
    }

    fn description_tag<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        document.select(&self.meta).find(|el| {
            el.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("description"))
        })
    }

    /// Canonical keys from JSON-LD blocks. Earlier blocks win; malformed
    /// blocks are skipped.
    fn json_ld_attributes(&self, document: &Html) -> Attributes {
        let mut attributes = Attributes::new();

        for script in document.select(&self.json_ld) {
            let raw = script.text().collect::<String>();
            let value: Value = match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    debug!(error = %e, "Skipping malformed JSON-LD block");
                    continue;
                }
            };

            for object in json_ld_objects(&value) {
                for key in ATTRIBUTE_KEYS {
                    if attributes.contains_key(key) {
                        continue;
                    }
                    if let Some(v) = object.get(key).filter(|v| v.is_string() || v.is_number()) {
                        attributes.insert(key.to_string(), v.clone());
                    }
                }
            }
        }

        attributes
    }
}

/// Top-level objects of a JSON-LD value: the value itself, array members,
/// and `@graph` members.
fn json_ld_objects(value: &Value) -> Vec<&serde_json::Map<String, Value>> {
    match value {
        Value::Object(map) => {
            let mut objects = vec![map];
            if let Some(Value::Array(graph)) = map.get("@graph") {
                objects.extend(graph.iter().filter_map(Value::as_object));
            }
            objects
        }
        Value::Array(items) => items.iter().flat_map(json_ld_objects).collect(),
        _ => Vec::new(),
    }
}
