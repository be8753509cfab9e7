//! Normalizes raw board payloads into flat [`BoardTable`]s.
//!
//! The board service returns deeply nested GraphQL payloads; this stage
//! flattens every item into a [`Record`] keyed by raw column id, tags it with
//! its source board, and surfaces the column metadata for the resolver.
//! Display text is kept verbatim; no coercion happens here.

use crate::error::{BiError, Result};
use crate::schema::{BoardResponse, BoardTable, Record};
use crate::trace::TraceLog;
use log::{debug, warn};
use std::collections::HashMap;

/// Flattens a raw payload into a single [`BoardTable`].
///
/// Records from every returned board are concatenated; the column metadata
/// of the first board describes the table (boards fetched together share a
/// shape). An error envelope maps to [`BiError::Upstream`], an empty board
/// list to [`BiError::NoData`]. Both are expected conditions the caller
/// turns into a terminal answer, not faults.
pub fn normalize_payload(payload: &BoardResponse, trace: &mut TraceLog) -> Result<BoardTable> {
    if let Some(errors) = &payload.errors {
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        let joined = messages.join("; ");
        warn!("Board API returned an error envelope: {}", joined);
        trace.push(format!("Board API error: {}", joined));
        return Err(BiError::Upstream(joined));
    }

    let boards = match &payload.data {
        Some(data) if !data.boards.is_empty() => &data.boards,
        _ => {
            trace.push("No boards returned.");
            return Err(BiError::NoData);
        }
    };

    let mut records = Vec::new();

    for board in boards {
        let board_name = board.name.as_deref().unwrap_or("Unknown").to_string();
        trace.push(format!("===== BOARD: {} =====", board_name));

        trace.push("COLUMN METADATA");
        for col in &board.columns {
            trace.push(format!(
                "Column Title: {} | Column ID: {} | Column Type: {}",
                col.title,
                col.id,
                String::from(col.column_type.clone())
            ));
        }

        let items = &board.items_page.items;
        if items.is_empty() {
            trace.push("No items found in this board.");
            continue;
        }

        let board_start = records.len();
        for item in items {
            let mut values = HashMap::with_capacity(item.column_values.len());
            for cell in &item.column_values {
                values.insert(cell.id.clone(), cell.text.clone().unwrap_or_default());
            }
            records.push(Record::new(item.name.clone(), board_name.clone(), values));
        }

        let added = records.len() - board_start;
        debug!("Normalized {} items from board '{}'", added, board_name);
        trace.push(format!("Normalized {} rows.", added));
        if let Some(sample) = records.get(board_start) {
            trace.push(format!("Sample row: {:?}", sample));
        }
    }

    Ok(BoardTable {
        records,
        columns: boards[0].columns.clone(),
    })
}
