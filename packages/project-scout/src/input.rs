//! Reading candidate URLs from an uploaded delimited file.

use std::io::Read;

use crate::error::InputError;

/// Header of the column holding candidate URLs.
pub const SOURCE_URL_COLUMN: &str = "Source URL";

/// Read the `Source URL` column from a CSV file with a header row.
///
/// Blank cells are skipped; values are returned as written (validation
/// happens when the pipeline ingests them). Header matching ignores
/// surrounding whitespace and a UTF-8 byte-order mark.
pub fn read_source_urls<R: Read>(reader: R) -> Result<Vec<String>, InputError> {
    let mut csv = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let column = csv
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == SOURCE_URL_COLUMN)
        .ok_or_else(|| InputError::MissingColumn(SOURCE_URL_COLUMN.to_string()))?;

    let mut urls = Vec::new();
    for row in csv.records() {
        let row = row?;
        if let Some(cell) = row.get(column).map(str::trim).filter(|c| !c.is_empty()) {
            urls.push(cell.to_string());
        }
    }
    Ok(urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_source_url_column() {
        let data = "City,Source URL,Notes\n\
                    Fontana,https://fontana.org/projects,\n\
                    Corona,,blank\n\
                    Vallejo,\" https://vallejo.gov/capital \",\"quoted, with comma\"\n";

        let urls = read_source_urls(data.as_bytes()).unwrap();
        assert_eq!(
            urls,
            vec!["https://fontana.org/projects", "https://vallejo.gov/capital"]
        );
    }

    #[test]
    fn test_missing_column() {
        let result = read_source_urls("url\nhttps://a.gov\n".as_bytes());
        assert!(matches!(result, Err(InputError::MissingColumn(_))));
    }

    #[test]
    fn test_bom_prefixed_header() {
        let urls = read_source_urls("\u{feff}Source URL\nhttps://a.gov\n".as_bytes()).unwrap();
        assert_eq!(urls, vec!["https://a.gov"]);
    }
}
