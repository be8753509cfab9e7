//! Renders aggregates into the final human-readable summary.
//!
//! Pure formatting: no decision logic lives here, and zero values render
//! as zeros rather than being omitted.

use crate::engine::{PipelineMetrics, WorkOrderTotals};

/// Formats a monetary amount as rupees with comma grouping and two
/// decimals, e.g. `₹10,000.00`.
pub fn format_inr(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("₹{}{}.{}", sign, grouped, frac_part)
}

/// The terminal answer when the sector filter matches nothing.
pub fn no_deals_message(sector: &str) -> String {
    format!("No active deals found for sector {}.", sector)
}

/// Assembles the labeled summary report for one sector and optional time
/// period.
pub fn compose_summary(
    sector: &str,
    time_period: Option<&str>,
    metrics: &PipelineMetrics,
    work: &WorkOrderTotals,
) -> String {
    let heading = match time_period {
        Some(period) => format!("Business summary for {} ({})", sector.to_uppercase(), period),
        None => format!("Business summary for {}", sector.to_uppercase()),
    };

    format!(
        "{heading}\n\
         \n\
         Pipeline\n\
         - Open deals: {count}\n\
         - Total pipeline value: {total}\n\
         - Average deal size: {avg}\n\
         - High-probability deals: {high} ({pct}%)\n\
         - Stage distribution: {stages}\n\
         \n\
         Work orders\n\
         - Billed: {billed}\n\
         - Collected: {collected}\n\
         - Receivable: {receivable}\n\
         \n\
         Data quality: {missing} deal(s) had missing or blank deal values.",
        heading = heading,
        count = metrics.open_count,
        total = format_inr(metrics.total_pipeline),
        avg = format_inr(metrics.avg_size),
        high = metrics.high_prob_count,
        pct = metrics.prob_pct,
        stages = metrics.stage_distribution,
        billed = format_inr(work.billed),
        collected = format_inr(work.collected),
        receivable = format_inr(work.receivable),
        missing = metrics.missing_count,
    )
}
