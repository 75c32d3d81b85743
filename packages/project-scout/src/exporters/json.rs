//! JSON array export.

use std::path::PathBuf;
use tracing::info;

use super::{write_atomically, ExportSummary};
use crate::error::{ExportError, ExportResult};
use crate::traits::exporter::Exporter;
use crate::types::record::CanonicalRecord;

/// Writes the records as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, records: &[CanonicalRecord]) -> ExportResult<ExportSummary> {
        if records.is_empty() {
            return Err(ExportError::EmptyRecords);
        }

        let rendered = serde_json::to_vec_pretty(records)?;
        let bytes = write_atomically(&self.path, &rendered)?;

        info!(path = %self.path.display(), records = records.len(), "Exported JSON");

        Ok(ExportSummary {
            path: Some(self.path.clone()),
            records: records.len(),
            bytes,
        })
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::standardize::Standardizer;
    use crate::types::metadata::Attributes;

    #[test]
    fn test_writes_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let record = Standardizer::default().standardize(
            "Library expansion",
            "New wing",
            &Attributes::new(),
            None,
            "https://example.gov/library",
        );

        JsonExporter::new(&path).export(&[record.clone()]).unwrap();

        let written: Vec<CanonicalRecord> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(written, vec![record]);
    }

    #[test]
    fn test_empty_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        assert!(matches!(
            JsonExporter::new(&path).export(&[]),
            Err(ExportError::EmptyRecords)
        ));
        assert!(!path.exists());
    }
}
