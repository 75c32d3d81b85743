//! Record sinks.
//!
//! - [`CsvExporter`] - canonical CSV, one row per record
//! - [`JsonExporter`] - JSON array of records, for indexing
//!
//! File sinks are all-or-nothing: output goes to a sibling `*.partial` file
//! that is renamed into place only after every byte was written.

pub mod csv;
pub mod json;

pub use self::csv::{render_csv, CsvExporter};
pub use self::json::JsonExporter;

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ExportResult;

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Destination file, if the sink was a file
    pub path: Option<PathBuf>,
    pub records: usize,
    pub bytes: u64,
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Write `bytes` to `path` via a temporary sibling, then rename.
///
/// On failure the temporary file is removed and `path` is left untouched.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> ExportResult<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let partial = partial_path(path);
    let result: io::Result<()> = fs::write(&partial, bytes).and_then(|_| fs::rename(&partial, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomically_leaves_no_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let bytes = write_atomically(&path, b"a,b\n").unwrap();

        assert_eq!(bytes, 4);
        assert_eq!(fs::read(&path).unwrap(), b"a,b\n");
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_failed_write_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // Renaming a file onto an existing directory fails.
        let path = dir.path().join("taken");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_atomically(&path, b"data").is_err());
        assert!(!partial_path(&path).exists());
        assert!(path.join("keep").exists());
    }
}
