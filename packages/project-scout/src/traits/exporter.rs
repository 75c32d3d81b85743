//! Exporter trait for writing records to a sink.

use crate::error::ExportResult;
use crate::exporters::ExportSummary;
use crate::types::record::CanonicalRecord;

/// Writes canonical records somewhere.
///
/// Implementations must refuse an empty slice with
/// [`ExportError::EmptyRecords`](crate::error::ExportError::EmptyRecords)
/// and must not leave a partially written artifact behind on failure.
pub trait Exporter: Send + Sync {
    fn export(&self, records: &[CanonicalRecord]) -> ExportResult<ExportSummary>;

    /// Get the exporter name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
