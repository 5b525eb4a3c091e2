//! Projection of accumulated groups into formatted result rows

use super::accumulator::{Accumulator, GroupState};
use super::resolver::ResolvedMetric;
use super::types::{MetricOp, Query};

/// Two decimal places, ties rounded away from zero.
///
/// Rounding is applied to the exact binary value, so `2.675` (stored as
/// 2.67499...) formats as `2.67` and `0.015` as `0.01`. `{:.2}` already
/// rounds the exact value but breaks ties to even, and the only doubles that
/// sit exactly on a two-decimal midpoint are odd multiples of 1/8.
pub fn format_decimal(value: f64) -> String {
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format_midpoint(value);
    }

    let text = format!("{:.2}", value);
    // avoid "-0.00"
    if text == "-0.00" {
        "0.00".to_string()
    } else {
        text
    }
}

/// `value` is `n + k/8` with odd `k`, so the cents are 12.5, 37.5, 62.5 or
/// 87.5 and all the arithmetic below is exact.
fn format_midpoint(value: f64) -> String {
    let magnitude = value.abs();
    let whole = magnitude.trunc();
    let cents = ((magnitude - whole) * 100.0).ceil() as u32;
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{:.0}.{:02}", sign, whole, cents)
}

pub fn format_metric(op: MetricOp, acc: &Accumulator) -> String {
    match op {
        MetricOp::Count => acc.count.to_string(),
        MetricOp::Sum => format_decimal(acc.sum),
        MetricOp::Avg => format_decimal(acc.average()),
    }
}

/// Group-by names in query order, then one synthetic name per metric
pub fn column_names(query: &Query) -> Vec<String> {
    query
        .group_by
        .iter()
        .cloned()
        .chain(query.metrics.iter().map(|m| m.column_name()))
        .collect()
}

/// Format groups in discovery order, keeping at most `limit` rows
pub fn project(
    groups: Vec<GroupState>,
    metrics: &[ResolvedMetric],
    limit: Option<usize>,
) -> Vec<Vec<String>> {
    let take = limit.unwrap_or(usize::MAX);

    groups
        .into_iter()
        .take(take)
        .map(|group| {
            let mut row = group.key;
            row.extend(
                group
                    .accumulators
                    .iter()
                    .zip(metrics)
                    .map(|(acc, metric)| format_metric(metric.op, acc)),
            );
            row
        })
        .collect()
}
