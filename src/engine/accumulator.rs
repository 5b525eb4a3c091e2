//! Per-group metric accumulation in first-seen group order

use super::resolver::ResolvedMetric;
use super::types::MetricOp;
use crate::csvutil::infer_numeric;
use csv::StringRecord;
use std::collections::HashMap;

/// Running state for one (group, metric) pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: u64,
}

impl Accumulator {
    pub fn update(&mut self, metric: &ResolvedMetric, row: &StringRecord) {
        match metric.op {
            MetricOp::Count => self.count += 1,
            MetricOp::Sum | MetricOp::Avg => {
                let parsed = metric
                    .idx
                    .and_then(|idx| row.get(idx))
                    .and_then(infer_numeric);
                if let Some(value) = parsed {
                    self.sum += value;
                    self.count += 1;
                }
            }
        }
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group-by values, one per group-by column, in query order.
/// Missing trailing fields on short rows contribute empty strings.
pub type GroupKey = Vec<String>;

pub fn group_key(group_by: &[usize], row: &StringRecord) -> GroupKey {
    group_by
        .iter()
        .map(|&idx| row.get(idx).unwrap_or("").to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct GroupState {
    pub key: GroupKey,
    pub accumulators: Vec<Accumulator>,
}

pub struct GroupAggregator {
    metrics: Vec<ResolvedMetric>,
    index: HashMap<GroupKey, usize>,
    groups: Vec<GroupState>,
}

impl GroupAggregator {
    pub fn new(metrics: Vec<ResolvedMetric>) -> Self {
        Self {
            metrics,
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Fold one row that already passed the filters into its group
    pub fn add_row(&mut self, key: GroupKey, row: &StringRecord) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push(GroupState {
                    key: key.clone(),
                    accumulators: vec![Accumulator::default(); self.metrics.len()],
                });
                self.index.insert(key, slot);
                slot
            }
        };

        let group = &mut self.groups[slot];
        for (acc, metric) in group.accumulators.iter_mut().zip(&self.metrics) {
            acc.update(metric, row);
        }
    }

    pub fn metrics(&self) -> &[ResolvedMetric] {
        &self.metrics
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Groups in the order their keys were first seen
    pub fn into_groups(self) -> Vec<GroupState> {
        self.groups
    }
}
