//! Row filter evaluation

use super::error::{ColumnRole, EngineError};
use super::types::FilterOp;
use csv::StringRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    pub idx: usize,
    pub op: FilterOp,
    /// Lower-cased up front for `contains`
    pub value: String,
}

impl ResolvedFilter {
    pub fn new(idx: usize, op: &str, value: &str) -> Result<Self, EngineError> {
        let op = FilterOp::from_str(op).ok_or_else(|| EngineError::UnknownOperation {
            op: op.to_string(),
            role: ColumnRole::Filter,
        })?;

        let value = match op {
            FilterOp::Eq => value.to_string(),
            FilterOp::Contains => value.to_lowercase(),
        };

        Ok(Self { idx, op, value })
    }

    /// A field missing from a short row never matches
    pub fn matches(&self, row: &StringRecord) -> bool {
        let Some(field) = row.get(self.idx) else {
            return false;
        };

        match self.op {
            FilterOp::Eq => field == self.value,
            FilterOp::Contains => field.to_lowercase().contains(&self.value),
        }
    }
}

/// Logical AND over `filters`, stopping at the first failure
pub fn row_passes(filters: &[ResolvedFilter], row: &StringRecord) -> bool {
    filters.iter().all(|f| f.matches(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_eq_is_exact() {
        let filter = ResolvedFilter::new(1, "eq", "Books").unwrap();
        assert!(filter.matches(&row(&["1", "Books"])));
        assert!(!filter.matches(&row(&["1", "books"])));
        assert!(!filter.matches(&row(&["1", "Books "])));
    }

    #[test]
    fn test_contains_ignores_case() {
        let filter = ResolvedFilter::new(0, "contains", "ITEM").unwrap();
        assert!(filter.matches(&row(&["Item X"])));
        assert!(filter.matches(&row(&["another item"])));
        assert!(!filter.matches(&row(&["widget"])));
    }

    #[test]
    fn test_contains_unicode_lowercase() {
        let filter = ResolvedFilter::new(0, "contains", "ÄPFEL").unwrap();
        assert!(filter.matches(&row(&["Grüne äpfel"])));
    }

    #[test]
    fn test_short_row_fails_filter() {
        let filter = ResolvedFilter::new(3, "eq", "").unwrap();
        assert!(!filter.matches(&row(&["a", "b"])));
    }

    #[test]
    fn test_all_filters_must_pass() {
        let filters = vec![
            ResolvedFilter::new(0, "eq", "Books").unwrap(),
            ResolvedFilter::new(1, "contains", "item").unwrap(),
        ];
        assert!(row_passes(&filters, &row(&["Books", "Item B"])));
        assert!(!row_passes(&filters, &row(&["Books", "Widget"])));
        assert!(!row_passes(&filters, &row(&["Music", "Item C"])));
        assert!(row_passes(&[], &row(&["anything"])));
    }

    #[test]
    fn test_unknown_op_rejected() {
        assert!(matches!(
            ResolvedFilter::new(0, "gt", "10"),
            Err(EngineError::UnknownOperation { role: ColumnRole::Filter, .. })
        ));
    }
}
