//! Rendering report results for the command line

use crate::engine::ReportResponse;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum OutputError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Csv(csv::Error),
}

impl From<std::io::Error> for OutputError {
    fn from(err: std::io::Error) -> Self {
        OutputError::Io(err)
    }
}

impl From<serde_json::Error> for OutputError {
    fn from(err: serde_json::Error) -> Self {
        OutputError::Serialization(err)
    }
}

impl From<csv::Error> for OutputError {
    fn from(err: csv::Error) -> Self {
        OutputError::Csv(err)
    }
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Serialization(e) => write!(f, "Serialization error: {}", e),
            OutputError::Csv(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {}

/// JSON writes the full response including `rowsScanned` and the scan outcome.
/// CSV writes only the column header and result rows.
pub fn write_response<W: Write>(
    response: &ReportResponse,
    format: OutputFormat,
    mut out: W,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, response)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(&mut out);
            writer.write_record(&response.columns)?;
            for row in &response.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScanOutcome;

    fn response() -> ReportResponse {
        ReportResponse {
            columns: vec!["category".to_string(), "sum(amount)".to_string()],
            rows: vec![
                vec!["Books, used".to_string(), "50.00".to_string()],
                vec!["Clothing".to_string(), "0.00".to_string()],
            ],
            rows_scanned: 3,
            scan: ScanOutcome::Completed,
        }
    }

    #[test]
    fn test_csv_output_quotes_fields() {
        let mut buf = Vec::new();
        write_response(&response(), OutputFormat::Csv, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "category,sum(amount)\n\"Books, used\",50.00\nClothing,0.00\n"
        );
    }

    #[test]
    fn test_json_output_fields() {
        let mut buf = Vec::new();
        write_response(&response(), OutputFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["rowsScanned"], 3);
        assert_eq!(value["scan"]["status"], "completed");
        assert_eq!(value["rows"][1][0], "Clothing");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_str("csv"), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_str("xml"), None);
        assert_eq!(OutputFormat::Json.as_str(), "json");
    }
}
