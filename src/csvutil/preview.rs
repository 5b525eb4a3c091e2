//! Header plus the first few raw records of a CSV document

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::io::Read;

pub const DEFAULT_PREVIEW_ROWS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug)]
pub enum PreviewError {
    Empty,
    Csv(csv::Error),
}

impl From<csv::Error> for PreviewError {
    fn from(err: csv::Error) -> Self {
        PreviewError::Csv(err)
    }
}

impl std::fmt::Display for PreviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreviewError::Empty => write!(f, "csv file is empty"),
            PreviewError::Csv(e) => write!(f, "failed to parse csv: {}", e),
        }
    }
}

impl std::error::Error for PreviewError {}

fn to_strings(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

/// Read the header and up to `max_rows` records, unprocessed.
///
/// Unlike a report scan, a malformed record fails the whole preview.
pub fn preview<R: Read>(reader: R, max_rows: usize) -> Result<CsvPreview, PreviewError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut record = StringRecord::new();
    if !csv_reader.read_record(&mut record)? {
        return Err(PreviewError::Empty);
    }
    let columns = to_strings(&record);

    let mut rows = Vec::new();
    while rows.len() < max_rows && csv_reader.read_record(&mut record)? {
        rows.push(to_strings(&record));
    }

    Ok(CsvPreview { columns, rows })
}
