//! Engine error type
//!
//! Row-level CSV errors are not represented here: they end the scan early and
//! surface as [`ScanOutcome::TruncatedByError`](super::types::ScanOutcome).

use std::fmt;

/// Which part of the query referenced a column or operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    GroupBy,
    Metric,
    Filter,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::GroupBy => "groupBy",
            ColumnRole::Metric => "metric",
            ColumnRole::Filter => "filter",
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// The report file could not be opened
    Open(std::io::Error),
    /// Input has no header record
    EmptyInput,
    /// The header record itself is malformed
    Header(csv::Error),
    /// A quoted field in the header record is never closed
    UnterminatedHeader,
    UnknownColumn { name: String, role: ColumnRole },
    UnknownOperation { op: String, role: ColumnRole },
    /// `sum`/`avg` given without a field
    MissingMetricField { op: String },
}

impl EngineError {
    /// True for errors the caller can fix by changing the query or the file
    pub fn is_client_error(&self) -> bool {
        !matches!(self, EngineError::Open(_))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Open(err)
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        EngineError::Header(err)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Open(e) => write!(f, "failed to open report file: {}", e),
            EngineError::EmptyInput => write!(f, "failed to read csv headers: input is empty"),
            EngineError::Header(e) => write!(f, "failed to read csv headers: {}", e),
            EngineError::UnterminatedHeader => {
                write!(f, "failed to read csv headers: unterminated quoted field")
            }
            EngineError::UnknownColumn { name, role } => {
                write!(f, "invalid {} column: {}", role.as_str(), name)
            }
            EngineError::UnknownOperation { op, role } => {
                write!(f, "invalid {} operation: {}", role.as_str(), op)
            }
            EngineError::MissingMetricField { op } => {
                write!(f, "invalid metric: {} requires a field", op)
            }
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Open(e) => Some(e),
            EngineError::Header(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        let open = EngineError::Open(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(!open.is_client_error());

        let unknown = EngineError::UnknownColumn {
            name: "region".to_string(),
            role: ColumnRole::GroupBy,
        };
        assert!(unknown.is_client_error());
        assert!(EngineError::EmptyInput.is_client_error());
    }

    #[test]
    fn test_display_names_role_and_column() {
        let err = EngineError::UnknownColumn {
            name: "amount".to_string(),
            role: ColumnRole::Metric,
        };
        assert_eq!(err.to_string(), "invalid metric column: amount");

        let err = EngineError::UnknownOperation {
            op: "startsWith".to_string(),
            role: ColumnRole::Filter,
        };
        assert_eq!(err.to_string(), "invalid filter operation: startsWith");
    }
}
