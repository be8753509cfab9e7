//! Aggregation over the classified deal and work-order tables.

use crate::classifier;
use crate::cleaning::{cleaned_column, clean_monetary};
use crate::resolver::{ColumnMap, LogicalField};
use crate::schema::BoardTable;
use crate::trace::TraceLog;
use log::debug;
use std::collections::HashMap;

/// Pipeline aggregates over the open-deal set, plus the data-quality count
/// carried over from the pre-status-filter set.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineMetrics {
    pub open_count: usize,
    pub total_pipeline: f64,
    pub avg_size: f64,
    pub high_prob_count: usize,
    pub prob_pct: f64,
    /// "stage: count, ..." in descending frequency, or "N/A" when no stage
    /// column resolved.
    pub stage_distribution: String,
    pub missing_count: usize,
}

/// Summed work-order financials for the requested sector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorkOrderTotals {
    pub billed: f64,
    pub collected: f64,
    pub receivable: f64,
}

pub(crate) fn round2(value: f64) -> f64 {
    // Empty f64 sums yield -0.0 on recent toolchains; adding 0.0 normalizes
    // the sign so zero totals render as "₹0.00", not "₹-0.00".
    (value * 100.0).round() / 100.0 + 0.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Computes pipeline metrics over the final open-deal set. `missing_count`
/// is measured earlier, on the sector+time-filtered set, and passed through
/// untouched.
pub fn aggregate_deals(
    open: &BoardTable,
    map: &ColumnMap,
    missing_count: usize,
    trace: &mut TraceLog,
) -> PipelineMetrics {
    let open_count = open.len();
    let values = cleaned_column(open, map.get(LogicalField::Value));
    let total_pipeline = round2(values.iter().sum());
    let avg_size = if open_count == 0 {
        0.0
    } else {
        round2(total_pipeline / open_count as f64)
    };

    let high_prob_count = match map.get(LogicalField::Probability) {
        Some(column) => open
            .records
            .iter()
            .filter(|r| {
                r.get(column)
                    .map(|p| p.to_lowercase().contains("high"))
                    .unwrap_or(false)
            })
            .count(),
        None => 0,
    };
    let prob_pct = if open_count == 0 {
        0.0
    } else {
        round1(high_prob_count as f64 / open_count as f64 * 100.0)
    };

    let stage_distribution = match map.get(LogicalField::Stage) {
        Some(column) => stage_distribution(open, column),
        None => "N/A".to_string(),
    };

    debug!(
        "Aggregated {} open deals, pipeline {:.2}",
        open_count, total_pipeline
    );
    trace.push(format!(
        "Pipeline value computed: {:.2} across {} open deals.",
        total_pipeline, open_count
    ));

    PipelineMetrics {
        open_count,
        total_pipeline,
        avg_size,
        high_prob_count,
        prob_pct,
        stage_distribution,
        missing_count,
    }
}

/// Descending-frequency stage counts; ties break by stage name so the
/// rendering is deterministic.
fn stage_distribution(open: &BoardTable, stage_column: &str) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in &open.records {
        let stage = record.get(stage_column).unwrap_or("").trim();
        if stage.is_empty() {
            continue;
        }
        *counts.entry(stage.to_string()).or_insert(0) += 1;
    }

    if counts.is_empty() {
        return "N/A".to_string();
    }

    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
        .iter()
        .map(|(stage, count)| format!("{}: {}", stage, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sums billed/collected/receivable over work orders for the sector.
///
/// Sector filtering prefers the work-order board's own sector column, falls
/// back to the deals sector column id when the work table happens to carry
/// it, and otherwise includes every row. Unresolved monetary columns
/// contribute zero.
pub fn aggregate_work_orders(
    work: &BoardTable,
    map: &ColumnMap,
    sector: &str,
    trace: &mut TraceLog,
) -> WorkOrderTotals {
    let sector_column = map
        .get(LogicalField::WoSector)
        .filter(|c| work.has_column(c))
        .or_else(|| map.get(LogicalField::Sector).filter(|c| work.has_column(c)));

    let filtered = match sector_column {
        Some(column) => classifier::filter_by_sector(work, Some(column), sector, trace),
        None => {
            trace.push("No work-order sector column resolved; including all work orders.");
            work.clone()
        }
    };

    let sum_of = |field: LogicalField| -> f64 {
        let column = map.get(field).filter(|c| filtered.has_column(c));
        round2(
            filtered
                .records
                .iter()
                .map(|r| {
                    column
                        .and_then(|c| r.get(c))
                        .map(clean_monetary)
                        .unwrap_or(0.0)
                })
                .sum(),
        )
    };

    let totals = WorkOrderTotals {
        billed: sum_of(LogicalField::Billed),
        collected: sum_of(LogicalField::Collected),
        receivable: sum_of(LogicalField::Receivable),
    };

    trace.push(format!(
        "Work-order totals: billed {:.2}, collected {:.2}, receivable {:.2}.",
        totals.billed, totals.collected, totals.receivable
    ));
    totals
}
