//! Metadata pulled out of a survivor's HTML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ErrorKind;

/// Free-form structured hints keyed by canonical field name.
///
/// Ordered so serialized output is stable between runs.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Title, description and attribute hints for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ExtractedMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Gate before standardization: both title and description must be
    /// present and non-blank.
    pub fn require_title_and_description(&self) -> Result<(&str, &str), ErrorKind> {
        let title = non_blank(self.title.as_deref())
            .ok_or_else(|| ErrorKind::Precondition("missing title".to_string()))?;
        let description = non_blank(self.description.as_deref())
            .ok_or_else(|| ErrorKind::Precondition("missing description".to_string()))?;
        Ok((title, description))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
