//! The canonical output record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::metadata::Attributes;

/// Project status as published in the canonical schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProjectStatus {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl ProjectStatus {
    /// Case-insensitive parse; anything but open/closed is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(ProjectStatus::Open),
            "closed" => Some(ProjectStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Open => "Open",
            ProjectStatus::Closed => "Closed",
            ProjectStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GeoJSON point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapCoordinates {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl MapCoordinates {
    pub fn point(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

/// One fully standardized project record.
///
/// Field order matches [`CanonicalRecord::COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub aug_id: Uuid,
    pub country_name: String,
    pub country_code: String,
    pub map_coordinates: MapCoordinates,
    pub url: String,
    pub region_name: String,
    pub region_code: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub stages: String,
    pub date: NaiveDate,
    #[serde(rename = "procurementMethod")]
    pub procurement_method: String,
    pub budget: f64,
    pub currency: String,
    pub buyer: String,
    pub sector: String,
    pub subsector: String,
    pub bert_predicted_label: Attributes,
}

impl CanonicalRecord {
    /// Output columns, in order.
    pub const COLUMNS: [&'static str; 19] = [
        "aug_id",
        "country_name",
        "country_code",
        "map_coordinates",
        "url",
        "region_name",
        "region_code",
        "title",
        "description",
        "status",
        "stages",
        "date",
        "procurementMethod",
        "budget",
        "currency",
        "buyer",
        "sector",
        "subsector",
        "bert_predicted_label",
    ];

    /// Flatten into one cell per column. Nested values are JSON-encoded.
    pub fn to_row(&self) -> Result<[String; 19], serde_json::Error> {
        Ok([
            self.aug_id.to_string(),
            self.country_name.clone(),
            self.country_code.clone(),
            serde_json::to_string(&self.map_coordinates)?,
            self.url.clone(),
            self.region_name.clone(),
            self.region_code.clone(),
            self.title.clone(),
            self.description.clone(),
            self.status.to_string(),
            self.stages.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            self.procurement_method.clone(),
            self.budget.to_string(),
            self.currency.clone(),
            self.buyer.clone(),
            self.sector.clone(),
            self.subsector.clone(),
            serde_json::to_string(&self.bert_predicted_label)?,
        ])
    }
}
