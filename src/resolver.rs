//! Resolves logical field names to board-specific column ids.
//!
//! Boards expose opaque column ids ("text_mm0y8szr") whose meaning only the
//! human-facing title carries. Resolution matches lower-cased titles against
//! an ordered rule table; ambiguous titles ("Sector") are disambiguated by
//! the declared column type. When several titles qualify for the same
//! logical key the later column wins: last-match-wins is the documented
//! contract, kept deliberately.

use crate::schema::{ColumnMetadata, ColumnType};
use crate::trace::TraceLog;
use log::debug;
use std::collections::HashMap;
use std::fmt;

/// A semantic field name, independent of any board's actual column ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalField {
    Sector,
    Value,
    Status,
    Probability,
    Stage,
    TentativeClose,
    Close,
    Billed,
    Collected,
    Receivable,
    WoSector,
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalField::Sector => "sector",
            LogicalField::Value => "value",
            LogicalField::Status => "status",
            LogicalField::Probability => "probability",
            LogicalField::Stage => "stage",
            LogicalField::TentativeClose => "tentative_close",
            LogicalField::Close => "close",
            LogicalField::Billed => "billed",
            LogicalField::Collected => "collected",
            LogicalField::Receivable => "receivable",
            LogicalField::WoSector => "wo_sector",
        };
        f.write_str(name)
    }
}

/// Mapping from logical field to resolved column id. An absent key means the
/// board carries no such column; downstream stages degrade to zero/"N/A"
/// rather than fail.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    entries: HashMap<LogicalField, String>,
}

impl ColumnMap {
    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.entries.get(&field).map(String::as_str)
    }

    pub fn insert(&mut self, field: LogicalField, column_id: String) {
        self.entries.insert(field, column_id);
    }

    /// The close-date column to use for temporal filtering, resolved by
    /// availability: tentative close date first, plain close date otherwise.
    pub fn close_date_column(&self) -> Option<&str> {
        self.get(LogicalField::TentativeClose)
            .or_else(|| self.get(LogicalField::Close))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

type Rule = (LogicalField, fn(&str, &ColumnType) -> bool);

/// Deals-board rules, in evaluation order. Each rule is an independent
/// check: a title satisfying both close-date conditions sets both keys.
const DEAL_RULES: &[Rule] = &[
    (LogicalField::Sector, |title, kind| {
        title.contains("sector/service") || (title == "sector" && *kind == ColumnType::Text)
    }),
    (LogicalField::Value, |title, _| title.contains("deal value")),
    (LogicalField::Status, |title, _| {
        title.contains("deal status")
    }),
    (LogicalField::Probability, |title, _| {
        title.contains("closure probability")
    }),
    (LogicalField::Stage, |title, _| title.contains("deal stage")),
    (LogicalField::TentativeClose, |title, _| {
        title.contains("tentative close date")
    }),
    (LogicalField::Close, |title, _| title.contains("close date")),
];

/// Work-orders-board rules, in evaluation order.
const WORK_ORDER_RULES: &[Rule] = &[
    (LogicalField::Billed, |title, _| {
        title.contains("billed value") && title.contains("rupees") && title.contains("incl")
    }),
    (LogicalField::Collected, |title, _| {
        title.contains("collected amount") && title.contains("rupees")
    }),
    (LogicalField::Receivable, |title, _| {
        title.contains("amount receivable")
    }),
    (LogicalField::WoSector, |title, kind| {
        title == "sector" && *kind == ColumnType::Status
    }),
];

fn apply_rules(map: &mut ColumnMap, columns: &[ColumnMetadata], rules: &[Rule]) {
    for col in columns {
        let title = col.title.to_lowercase();
        let title = title.trim();
        for (field, matches) in rules {
            if matches(title, &col.column_type) {
                debug!("Resolved {} -> {} ('{}')", field, col.id, col.title);
                map.insert(*field, col.id.clone());
            }
        }
    }
}

/// Builds a [`ColumnMap`] from the deals-board and work-orders-board column
/// metadata. Unresolvable fields are simply absent, never an error.
pub fn resolve_columns(
    deal_columns: &[ColumnMetadata],
    work_columns: &[ColumnMetadata],
    trace: &mut TraceLog,
) -> ColumnMap {
    let mut map = ColumnMap::default();
    apply_rules(&mut map, deal_columns, DEAL_RULES);
    apply_rules(&mut map, work_columns, WORK_ORDER_RULES);

    trace.push(format!("Resolved {} logical columns.", map.len()));
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(id: &str, title: &str, kind: ColumnType) -> ColumnMetadata {
        ColumnMetadata {
            id: id.to_string(),
            title: title.to_string(),
            column_type: kind,
        }
    }

    #[test]
    fn test_resolves_deal_columns_by_title() {
        let columns = vec![
            col("c1", "Sector/Service", ColumnType::Status),
            col("c2", "Deal Value (INR)", ColumnType::Numeric),
            col("c3", "Deal Status", ColumnType::Status),
            col("c4", "Closure Probability", ColumnType::Status),
            col("c5", "Deal Stage", ColumnType::Status),
            col("c6", "Tentative Close Date", ColumnType::Date),
        ];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&columns, &[], &mut trace);

        assert_eq!(map.get(LogicalField::Sector), Some("c1"));
        assert_eq!(map.get(LogicalField::Value), Some("c2"));
        assert_eq!(map.get(LogicalField::Status), Some("c3"));
        assert_eq!(map.get(LogicalField::Probability), Some("c4"));
        assert_eq!(map.get(LogicalField::Stage), Some("c5"));
        assert_eq!(map.get(LogicalField::TentativeClose), Some("c6"));
        assert_eq!(map.get(LogicalField::Close), None);
    }

    #[test]
    fn test_plain_sector_title_requires_text_type() {
        let text = vec![col("c1", "Sector", ColumnType::Text)];
        let status = vec![col("c2", "Sector", ColumnType::Status)];
        let mut trace = TraceLog::new();

        let map = resolve_columns(&text, &[], &mut trace);
        assert_eq!(map.get(LogicalField::Sector), Some("c1"));

        let map = resolve_columns(&status, &[], &mut trace);
        assert_eq!(map.get(LogicalField::Sector), None);
    }

    #[test]
    fn test_last_match_wins_for_duplicate_titles() {
        let columns = vec![
            col("old", "Deal Value 2023", ColumnType::Numeric),
            col("new", "Deal Value 2024", ColumnType::Numeric),
        ];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&columns, &[], &mut trace);

        assert_eq!(map.get(LogicalField::Value), Some("new"));
    }

    #[test]
    fn test_title_matching_both_close_conditions_sets_both_keys() {
        let columns = vec![col("c1", "Tentative Close Date", ColumnType::Date)];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&columns, &[], &mut trace);

        // "tentative close date" contains "close date" too; both checks are
        // independent, so both logical keys resolve to the same column.
        assert_eq!(map.get(LogicalField::TentativeClose), Some("c1"));
        assert_eq!(map.get(LogicalField::Close), Some("c1"));
        assert_eq!(map.close_date_column(), Some("c1"));
    }

    #[test]
    fn test_close_date_column_falls_back_to_plain_close() {
        let columns = vec![col("c1", "Close Date", ColumnType::Date)];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&columns, &[], &mut trace);

        assert_eq!(map.get(LogicalField::TentativeClose), None);
        assert_eq!(map.close_date_column(), Some("c1"));
    }

    #[test]
    fn test_resolves_work_order_columns() {
        let columns = vec![
            col("w1", "Billed Value (Rupees, incl GST)", ColumnType::Numeric),
            col("w2", "Collected Amount (Rupees)", ColumnType::Numeric),
            col("w3", "Amount Receivable", ColumnType::Numeric),
            col("w4", "Sector", ColumnType::Status),
        ];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&[], &columns, &mut trace);

        assert_eq!(map.get(LogicalField::Billed), Some("w1"));
        assert_eq!(map.get(LogicalField::Collected), Some("w2"));
        assert_eq!(map.get(LogicalField::Receivable), Some("w3"));
        assert_eq!(map.get(LogicalField::WoSector), Some("w4"));
    }

    #[test]
    fn test_billed_requires_all_three_fragments() {
        let columns = vec![col("w1", "Billed Value (Rupees)", ColumnType::Numeric)];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&[], &columns, &mut trace);

        assert_eq!(map.get(LogicalField::Billed), None);
    }

    #[test]
    fn test_unmatched_titles_resolve_nothing() {
        let columns = vec![
            col("c1", "Owner", ColumnType::Text),
            col("c2", "Notes", ColumnType::Text),
        ];
        let mut trace = TraceLog::new();
        let map = resolve_columns(&columns, &[], &mut trace);

        assert!(map.is_empty());
    }
}
