//! # Pipeline BI
//!
//! A library for turning loosely-typed, schema-fluid project-board exports
//! into deterministic sector pipeline and financial summaries.
//!
//! ## Core Concepts
//!
//! - **Board payload**: the raw nested GraphQL export of one board (column
//!   metadata plus items whose cells are free display text)
//! - **Column resolution**: logical field names (sector, value, stage, ...)
//!   matched to opaque board-specific column ids by title and type
//! - **Open deal**: a deal not marked closed and not in a terminal stage
//!   (lost, completed, not relevant, on hold)
//! - **Data-quality count**: deals whose raw monetary text was missing or
//!   blank, reported alongside the aggregates instead of being papered over
//! - **Trace log**: a caller-owned, append-only diagnostic transcript of
//!   every stage; observational only, never consulted for control flow
//!
//! ## Example
//!
//! ```rust,ignore
//! use pipeline_bi::*;
//! use chrono::NaiveDate;
//!
//! let mut trace = TraceLog::new();
//! let args = BiQueryArgs {
//!     sector: "manufacturing".to_string(),
//!     time_period: Some("this quarter".to_string()),
//! };
//!
//! let output = run_bi_query(
//!     &deals_payload,
//!     &work_orders_payload,
//!     &args,
//!     NaiveDate::from_ymd_opt(2025, 8, 25).unwrap(),
//!     &mut trace,
//! );
//!
//! match output {
//!     QueryOutput::Answer { final_answer } => println!("{final_answer}"),
//!     QueryOutput::Error { error } => eprintln!("{error}"),
//! }
//! ```

pub mod classifier;
pub mod cleaning;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod temporal;
pub mod trace;

#[cfg(feature = "monday")]
pub mod monday;

pub use engine::{aggregate_deals, aggregate_work_orders, PipelineMetrics, WorkOrderTotals};
pub use error::{BiError, Result};
pub use ingestion::normalize_payload;
pub use report::{compose_summary, no_deals_message};
pub use resolver::{resolve_columns, ColumnMap, LogicalField};
pub use schema::*;
pub use temporal::{filter_by_period, parse_time_period, QuarterWindow};
pub use trace::TraceLog;

use chrono::NaiveDate;
use log::{info, warn};

/// Runs one stateless BI query over freshly fetched board payloads.
///
/// Every reachable path terminates in a string result: an upstream error on
/// the deals board yields the legacy `Error` shape, everything else an
/// `Answer`. A failed work-orders payload degrades to zero financials with
/// a trace note. `now` is injected so "this quarter" is deterministic.
pub fn run_bi_query(
    deals_payload: &BoardResponse,
    work_payload: &BoardResponse,
    args: &BiQueryArgs,
    now: NaiveDate,
    trace: &mut TraceLog,
) -> QueryOutput {
    info!("Running BI query for sector '{}'", args.sector);
    trace.push(format!("Running BI query for sector '{}'.", args.sector));

    trace.push("Normalizing Deals board payload...");
    let deals = match normalize_payload(deals_payload, trace) {
        Ok(table) => table,
        Err(err) => {
            warn!("Deals payload unusable: {}", err);
            trace.push(format!("Deals payload unusable: {}", err));
            return QueryOutput::error("Failed to fetch Deals data.");
        }
    };

    trace.push("Normalizing Work Orders board payload...");
    let work = match normalize_payload(work_payload, trace) {
        Ok(table) => table,
        Err(err) => {
            warn!("Work Orders payload unusable: {}", err);
            trace.push("Work Orders unavailable; financial totals default to zero.");
            BoardTable::default()
        }
    };

    let map = resolve_columns(&deals.columns, &work.columns, trace);

    let by_sector = classifier::filter_by_sector(
        &deals,
        map.get(LogicalField::Sector),
        &args.sector,
        trace,
    );
    if by_sector.is_empty() {
        return QueryOutput::answer(no_deals_message(&args.sector));
    }

    let windowed = filter_by_period(
        &by_sector,
        map.close_date_column(),
        args.time_period.as_deref(),
        now,
        trace,
    );

    // Data quality is measured before status/stage filtering so closed and
    // terminal deals still count toward missing raw values.
    let missing = cleaning::missing_count(&windowed, map.get(LogicalField::Value));

    let open = classifier::open_deals(&windowed, &map, trace);
    let metrics = aggregate_deals(&open, &map, missing, trace);
    let totals = aggregate_work_orders(&work, &map, &args.sector, trace);

    QueryOutput::answer(compose_summary(
        &args.sector,
        args.time_period.as_deref(),
        &metrics,
        &totals,
    ))
}
