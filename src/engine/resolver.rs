//! Header resolution: column names and operations to flat indices

use super::error::{ColumnRole, EngineError};
use super::filter::ResolvedFilter;
use super::types::{MetricOp, Query};
use std::collections::HashMap;

/// Column name to zero-based position. Duplicate names resolve to the last occurrence.
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut positions = HashMap::new();
        for (idx, name) in headers.into_iter().enumerate() {
            positions.insert(name.to_string(), idx);
        }
        Self { positions }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    fn require(&self, name: &str, role: ColumnRole) -> Result<usize, EngineError> {
        self.position(name).ok_or_else(|| EngineError::UnknownColumn {
            name: name.to_string(),
            role,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMetric {
    pub op: MetricOp,
    /// `None` only for `count` without a field
    pub idx: Option<usize>,
}

/// Query with every column reference replaced by its index
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub group_by: Vec<usize>,
    pub metrics: Vec<ResolvedMetric>,
    pub filters: Vec<ResolvedFilter>,
}

/// Validate `query` against the header and resolve it.
///
/// Runs before any data row is read; the first bad reference wins, checked in
/// group-by, metric, filter order.
pub fn resolve(header: &HeaderIndex, query: &Query) -> Result<ResolvedQuery, EngineError> {
    let group_by = query
        .group_by
        .iter()
        .map(|name| header.require(name, ColumnRole::GroupBy))
        .collect::<Result<Vec<_>, _>>()?;

    let mut metrics = Vec::with_capacity(query.metrics.len());
    for spec in &query.metrics {
        let op = MetricOp::from_str(&spec.op).ok_or_else(|| EngineError::UnknownOperation {
            op: spec.op.clone(),
            role: ColumnRole::Metric,
        })?;

        let idx = match spec.field_name() {
            Some(field) => Some(header.require(field, ColumnRole::Metric)?),
            None if op == MetricOp::Count => None,
            None => {
                return Err(EngineError::MissingMetricField {
                    op: spec.op.clone(),
                })
            }
        };

        metrics.push(ResolvedMetric { op, idx });
    }

    let mut filters = Vec::with_capacity(query.filters.len());
    for spec in &query.filters {
        let idx = header.require(&spec.field, ColumnRole::Filter)?;
        filters.push(ResolvedFilter::new(idx, &spec.op, &spec.value)?);
    }

    Ok(ResolvedQuery {
        group_by,
        metrics,
        filters,
    })
}
