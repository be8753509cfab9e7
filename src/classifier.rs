//! Sector matching and open-deal classification.
//!
//! Sector comparison is trimmed and lower-cased on both sides, then exact.
//! A deal stays in the pipeline unless its status is "closed" or, when a
//! stage column resolved, its stage text contains one of the terminal-stage
//! keywords.

use crate::resolver::{ColumnMap, LogicalField};
use crate::schema::BoardTable;
use crate::trace::TraceLog;
use log::debug;

/// Stage keywords marking a deal that will not progress. Matched as
/// lower-cased substrings, so "Deal Lost - Pricing" is terminal.
pub const TERMINAL_STAGE_KEYWORDS: [&str; 4] = ["lost", "completed", "not relevant", "on hold"];

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Keeps only rows whose sector text matches `sector` (trim + lowercase,
/// exact). With no resolved sector column nothing can match, which the
/// caller reports as "no active deals" rather than an error.
pub fn filter_by_sector(
    table: &BoardTable,
    sector_column: Option<&str>,
    sector: &str,
    trace: &mut TraceLog,
) -> BoardTable {
    let wanted = normalize(sector);

    let records: Vec<_> = match sector_column {
        Some(column) => table
            .records
            .iter()
            .filter(|r| normalize(r.get(column).unwrap_or("")) == wanted)
            .cloned()
            .collect(),
        None => {
            trace.push("No sector column resolved; sector match yields no rows.");
            Vec::new()
        }
    };

    debug!(
        "Sector filter '{}' kept {} of {} rows",
        sector,
        records.len(),
        table.len()
    );
    trace.push(format!(
        "Sector filter '{}': {} of {} rows remain.",
        sector,
        records.len(),
        table.len()
    ));

    BoardTable {
        records,
        columns: table.columns.clone(),
    }
}

/// Reduces a sector+time-filtered deal table to open deals: drops rows whose
/// status is "closed", then, if a stage column resolved, rows whose stage
/// contains a terminal keyword.
pub fn open_deals(table: &BoardTable, map: &ColumnMap, trace: &mut TraceLog) -> BoardTable {
    let status_column = map.get(LogicalField::Status);

    let mut records: Vec<_> = table
        .records
        .iter()
        .filter(|r| match status_column {
            Some(column) => normalize(r.get(column).unwrap_or("")) != "closed",
            None => true,
        })
        .cloned()
        .collect();

    if let Some(stage_column) = map.get(LogicalField::Stage) {
        trace.push(format!(
            "Excluding terminal stages: {}.",
            TERMINAL_STAGE_KEYWORDS.join(", ")
        ));
        records.retain(|r| {
            let stage = normalize(r.get(stage_column).unwrap_or(""));
            !TERMINAL_STAGE_KEYWORDS
                .iter()
                .any(|keyword| stage.contains(keyword))
        });
    }

    trace.push(format!("{} open deals remain.", records.len()));

    BoardTable {
        records,
        columns: table.columns.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Record;
    use std::collections::HashMap;

    fn deal(sector: &str, status: &str, stage: &str) -> Record {
        let mut values = HashMap::new();
        values.insert("sec".to_string(), sector.to_string());
        values.insert("st".to_string(), status.to_string());
        values.insert("stg".to_string(), stage.to_string());
        Record::new("deal".to_string(), "Deals".to_string(), values)
    }

    fn table(records: Vec<Record>) -> BoardTable {
        BoardTable {
            records,
            columns: Vec::new(),
        }
    }

    fn map_with_stage(with_stage: bool) -> ColumnMap {
        let mut map = ColumnMap::default();
        map.insert(LogicalField::Status, "st".to_string());
        if with_stage {
            map.insert(LogicalField::Stage, "stg".to_string());
        }
        map
    }

    #[test]
    fn test_sector_match_is_case_and_whitespace_insensitive() {
        let t = table(vec![
            deal("  Manufacturing ", "Open", ""),
            deal("MANUFACTURING", "Open", ""),
            deal("Retail", "Open", ""),
        ]);
        let mut trace = TraceLog::new();

        let filtered = filter_by_sector(&t, Some("sec"), " manufacturing ", &mut trace);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_absent_sector_yields_empty() {
        let t = table(vec![deal("Retail", "Open", "")]);
        let mut trace = TraceLog::new();

        let filtered = filter_by_sector(&t, Some("sec"), "mining", &mut trace);
        assert!(filtered.is_empty());

        let filtered = filter_by_sector(&t, None, "retail", &mut trace);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_closed_deals_excluded() {
        let t = table(vec![
            deal("m", "Open", ""),
            deal("m", " Closed ", ""),
            deal("m", "CLOSED", ""),
        ]);
        let mut trace = TraceLog::new();

        let open = open_deals(&t, &map_with_stage(false), &mut trace);
        assert_eq!(open.len(), 1);
    }

    #[test]
    fn test_terminal_stage_substring_exclusion() {
        let t = table(vec![
            deal("m", "Open", "Deal Lost - Pricing"),
            deal("m", "Open", "Negotiation"),
            deal("m", "Open", "On Hold"),
            deal("m", "Open", "Not Relevant"),
            deal("m", "Open", "Completed Handover"),
        ]);
        let mut trace = TraceLog::new();

        let open = open_deals(&t, &map_with_stage(true), &mut trace);
        assert_eq!(open.len(), 1);
        assert_eq!(open.records[0].get("stg"), Some("Negotiation"));
        assert!(trace.iter().any(|l| l.contains("lost")));
    }

    #[test]
    fn test_stage_exclusion_skipped_without_stage_column() {
        let t = table(vec![
            deal("m", "Open", "Deal Lost - Pricing"),
            deal("m", "Open", "Negotiation"),
        ]);
        let mut trace = TraceLog::new();

        let open = open_deals(&t, &map_with_stage(false), &mut trace);
        assert_eq!(open.len(), 2);
    }

    #[test]
    fn test_missing_status_column_keeps_all_rows() {
        let t = table(vec![deal("m", "Closed", "")]);
        let mut trace = TraceLog::new();

        let open = open_deals(&t, &ColumnMap::default(), &mut trace);
        assert_eq!(open.len(), 1);
    }
}
