//! CSV export in canonical column order.

use std::path::PathBuf;
use tracing::info;

use super::{write_atomically, ExportSummary};
use crate::error::{ExportError, ExportResult};
use crate::traits::exporter::Exporter;
use crate::types::record::CanonicalRecord;

/// Render records as CSV: header once, then one row per record.
///
/// `map_coordinates` and `bert_predicted_label` are JSON-encoded in their
/// cells. Fails on an empty slice.
pub fn render_csv(records: &[CanonicalRecord]) -> ExportResult<Vec<u8>> {
    if records.is_empty() {
        return Err(ExportError::EmptyRecords);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CanonicalRecord::COLUMNS)?;
    for record in records {
        writer.write_record(record.to_row()?)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// Writes a CSV file.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Exporter for CsvExporter {
    fn export(&self, records: &[CanonicalRecord]) -> ExportResult<ExportSummary> {
        let rendered = render_csv(records)?;
        let bytes = write_atomically(&self.path, &rendered)?;

        info!(
            path = %self.path.display(),
            records = records.len(),
            bytes,
            "Exported CSV"
        );

        Ok(ExportSummary {
            path: Some(self.path.clone()),
            records: records.len(),
            bytes,
        })
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::standardize::Standardizer;
    use crate::types::metadata::Attributes;

    fn records(n: usize) -> Vec<CanonicalRecord> {
        let standardizer = Standardizer::default();
        (0..n)
            .map(|i| {
                standardizer.standardize(
                    &format!("Project {i}"),
                    "Street, sidewalk \"and\" curb work",
                    &Attributes::new(),
                    None,
                    &format!("https://example.gov/{i}"),
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_records_rejected() {
        assert!(matches!(render_csv(&[]), Err(ExportError::EmptyRecords)));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let result = CsvExporter::new(&path).export(&[]);

        assert!(matches!(result, Err(ExportError::EmptyRecords)));
        assert!(!path.exists());
    }

    #[test]
    fn test_header_and_rows() {
        let rendered = render_csv(&records(2)).unwrap();

        let mut reader = csv::Reader::from_reader(rendered.as_slice());
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, CanonicalRecord::COLUMNS);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][4], "https://example.gov/0");
        assert_eq!(&rows[0][8], "Street, sidewalk \"and\" curb work");

        let coordinates: serde_json::Value = serde_json::from_str(&rows[1][3]).unwrap();
        assert_eq!(coordinates["type"], "Point");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standardized.csv");

        let summary = CsvExporter::new(&path).export(&records(3)).unwrap();

        assert_eq!(summary.records, 3);
        assert_eq!(summary.path.as_deref(), Some(path.as_path()));
        assert_eq!(summary.bytes, std::fs::metadata(&path).unwrap().len());
    }
}
