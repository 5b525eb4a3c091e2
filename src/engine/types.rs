//! Query descriptor and report result types

use serde::{Deserialize, Serialize};

/// Declarative aggregation request.
///
/// Operation names are kept as strings so that validation happens against the
/// header, alongside column resolution, instead of at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default)]
    pub group_by: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    /// `None` or `Some(0)` disables truncation
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Query {
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&n| n > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl MetricSpec {
    pub fn count() -> Self {
        Self {
            op: "count".to_string(),
            field: None,
        }
    }

    pub fn on(op: &str, field: &str) -> Self {
        Self {
            op: op.to_string(),
            field: Some(field.to_string()),
        }
    }

    /// Field name, treating an empty string as absent
    pub fn field_name(&self) -> Option<&str> {
        self.field.as_deref().filter(|f| !f.is_empty())
    }

    /// Synthetic column name: `op` or `op(field)`
    pub fn column_name(&self) -> String {
        match self.field_name() {
            Some(field) => format!("{}({})", self.op, field),
            None => self.op.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    pub op: String,
    pub value: String,
}

impl FilterSpec {
    pub fn new(field: &str, op: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            op: op.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricOp {
    Count,
    Sum,
    Avg,
}

impl MetricOp {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "count" => Some(MetricOp::Count),
            "sum" => Some(MetricOp::Sum),
            "avg" => Some(MetricOp::Avg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    Eq,
    Contains,
}

impl FilterOp {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(FilterOp::Eq),
            "contains" => Some(FilterOp::Contains),
            _ => None,
        }
    }
}

/// How the row scan ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed,
    /// A malformed record stopped the scan; rows read before it are aggregated
    TruncatedByError {
        line: Option<u64>,
        message: String,
    },
}

impl ScanOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, ScanOutcome::TruncatedByError { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub rows_scanned: u64,
    pub scan: ScanOutcome,
}
