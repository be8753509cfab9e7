//! Parses natural-language time-period expressions into quarter predicates
//! and applies them to a table.
//!
//! Supported expressions: "this quarter", "last quarter", "Q<n> <year>".
//! Anything else passes the table through untouched: an unrecognized
//! period is a defensive no-op, not an error. "Now" is injected so results
//! are deterministic under test.

use crate::schema::BoardTable;
use crate::trace::TraceLog;
use chrono::{Datelike, NaiveDate};
use log::debug;

/// The resolved date-range predicate for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterWindow {
    /// Keep only rows falling inside this calendar quarter.
    Quarter { year: i32, quarter: u32 },
    /// No filtering.
    All,
}

/// Calendar quarter of a date: Jan–Mar = 1 … Oct–Dec = 4.
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Parses a time-period expression against an injected "now".
///
/// "last quarter" wraps across the year boundary: evaluated in Q1 it
/// selects Q4 of the previous year.
pub fn parse_time_period(expr: Option<&str>, now: NaiveDate) -> QuarterWindow {
    let Some(expr) = expr else {
        return QuarterWindow::All;
    };
    let normalized = expr.trim().to_lowercase();

    match normalized.as_str() {
        "this quarter" => QuarterWindow::Quarter {
            year: now.year(),
            quarter: quarter_of(now),
        },
        "last quarter" => {
            let current = quarter_of(now);
            if current == 1 {
                QuarterWindow::Quarter {
                    year: now.year() - 1,
                    quarter: 4,
                }
            } else {
                QuarterWindow::Quarter {
                    year: now.year(),
                    quarter: current - 1,
                }
            }
        }
        _ => parse_explicit_quarter(&normalized).unwrap_or(QuarterWindow::All),
    }
}

/// Row dates are ISO "YYYY-MM-DD" from the board service, with "DD/MM/YYYY"
/// accepted as a fallback for hand-edited cells. Anything else fails the
/// parse and the row is treated as not matching the quarter.
fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .ok()
}

/// "q<N> <YYYY>" with optional whitespace between the quarter and the year.
fn parse_explicit_quarter(normalized: &str) -> Option<QuarterWindow> {
    let rest = normalized.strip_prefix('q')?;
    let quarter = rest.chars().next()?.to_digit(10)?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    let year: i32 = rest[1..].trim().parse().ok()?;
    Some(QuarterWindow::Quarter { year, quarter })
}

/// Applies a time-period expression to a table using the given date column.
///
/// Returns a new table (value semantics; the caller's table is untouched).
/// With no expression, or a date column the table does not declare, the
/// table passes through unchanged. Rows whose date text fails to parse are
/// dropped by quarter filters but retained by the pass-through default.
pub fn filter_by_period(
    table: &BoardTable,
    date_column: Option<&str>,
    expr: Option<&str>,
    now: NaiveDate,
    trace: &mut TraceLog,
) -> BoardTable {
    let Some(date_column) = date_column else {
        return table.clone();
    };
    if !table.has_column(date_column) {
        return table.clone();
    }

    let window = parse_time_period(expr, now);
    let QuarterWindow::Quarter { year, quarter } = window else {
        if let Some(expr) = expr {
            trace.push(format!("Unrecognized time period '{}'; no filter applied.", expr));
        }
        return table.clone();
    };

    let records: Vec<_> = table
        .records
        .iter()
        .filter(|record| {
            record
                .get(date_column)
                .and_then(parse_row_date)
                .map(|date| date.year() == year && quarter_of(date) == quarter)
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    debug!(
        "Quarter filter Q{} {} kept {} of {} rows",
        quarter,
        year,
        records.len(),
        table.len()
    );
    trace.push(format!(
        "Applied time filter Q{} {}: {} of {} rows remain.",
        quarter,
        year,
        records.len(),
        table.len()
    ));

    BoardTable {
        records,
        columns: table.columns.clone(),
    }
}
