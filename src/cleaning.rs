//! Coercion of free-text monetary fields.
//!
//! Board users type whatever they like into value columns: "₹10,000",
//! "10000 approx", "" or "nan". Cleaning is a pure function with a
//! documented zero default: an unparseable value never raises, and the
//! data-quality signal is carried separately by [`missing_count`].

use crate::schema::BoardTable;

/// Raw text that counts as a missing monetary value, compared after
/// trimming. Matches what an upstream export writes for absent cells.
const MISSING_MARKERS: [&str; 3] = ["", "nan", "None"];

/// Strips every character that is not a digit or `.` and parses the rest.
/// Empty results and parse failures coerce to exactly 0.0. Idempotent on
/// already-clean numeric strings.
pub fn clean_monetary(raw: &str) -> f64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Counts rows whose raw, uncleaned, trimmed text is a missing marker.
///
/// Callers evaluate this over the sector+time-filtered set, before status
/// and stage filtering. A column the table never resolved means every raw
/// value is absent, so every row counts.
pub fn missing_count(table: &BoardTable, column: Option<&str>) -> usize {
    table
        .records
        .iter()
        .filter(|record| {
            let raw = column.and_then(|c| record.get(c)).unwrap_or("");
            MISSING_MARKERS.contains(&raw.trim())
        })
        .count()
}

/// Cleans one monetary column into numbers, one per row. An unresolved
/// column yields an all-zero column of the same length.
pub fn cleaned_column(table: &BoardTable, column: Option<&str>) -> Vec<f64> {
    table
        .records
        .iter()
        .map(|record| {
            column
                .and_then(|c| record.get(c))
                .map(clean_monetary)
                .unwrap_or(0.0)
        })
        .collect()
}
