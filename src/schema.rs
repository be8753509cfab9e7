use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// Declared type of a board column, as reported by the board service.
///
/// The wire value is a free string ("text", "status", "color", "numbers", ...),
/// so anything unrecognized is preserved verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Text,
    /// Covers both "status" and the older "color" wire name.
    Status,
    Numeric,
    Date,
    Other(String),
}

impl From<String> for ColumnType {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "text" => ColumnType::Text,
            "status" | "color" => ColumnType::Status,
            "numbers" | "numeric" => ColumnType::Numeric,
            "date" => ColumnType::Date,
            _ => ColumnType::Other(raw),
        }
    }
}

impl From<ColumnType> for String {
    fn from(kind: ColumnType) -> Self {
        match kind {
            ColumnType::Text => "text".to_string(),
            ColumnType::Status => "status".to_string(),
            ColumnType::Numeric => "numbers".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::Other(raw) => raw,
        }
    }
}

/// Column metadata as declared on a board. Immutable for the duration of one
/// query invocation; the `id` is opaque and board-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Top-level envelope returned by the board GraphQL API: either a data
/// payload or an error list, never both in practice.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardResponse {
    #[serde(default)]
    pub data: Option<BoardData>,
    #[serde(default)]
    pub errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardData {
    #[serde(default)]
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    #[serde(default)]
    pub items_page: ItemsPage,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub column_values: Vec<ColumnValue>,
}

/// One cell of an item. `text` is the display rendering and is what the
/// pipeline keeps; `value` is the service's internal structured form and is
/// deliberately ignored downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnValue {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A flat row: item name, source board, and one raw text entry per column id.
/// Raw text is preserved verbatim; numeric/date coercion happens later and
/// locally where a stage needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub board_name: String,
    values: HashMap<String, String>,
}

impl Record {
    pub fn new(name: String, board_name: String, values: HashMap<String, String>) -> Self {
        Self {
            name,
            board_name,
            values,
        }
    }

    /// Raw display text for a column id, if the item carried that column.
    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.values.get(column_id).map(String::as_str)
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }
}

/// An ordered sequence of records from one board (or several boards sharing
/// a shape), together with the column metadata needed to interpret them.
#[derive(Debug, Clone, Default)]
pub struct BoardTable {
    pub records: Vec<Record>,
    pub columns: Vec<ColumnMetadata>,
}

impl BoardTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the table declares a column with this id.
    pub fn has_column(&self, column_id: &str) -> bool {
        self.columns.iter().any(|c| c.id == column_id)
    }
}

/// Arguments for one BI query invocation, as supplied by the dispatching
/// collaborator (typically an LLM tool call).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BiQueryArgs {
    #[schemars(description = "The business sector to analyze")]
    pub sector: String,

    #[schemars(
        description = "Time filter like 'this quarter', 'last quarter', or 'Q2 2025'. Omit for all time."
    )]
    pub time_period: Option<String>,
}

impl BiQueryArgs {
    /// The function-calling tool definition the dispatching collaborator
    /// registers with its LLM. The parameter schema is generated from this
    /// type so the two can never drift apart.
    pub fn tool_definition() -> serde_json::Value {
        let schema = schemars::schema_for!(BiQueryArgs);
        json!({
            "type": "function",
            "function": {
                "name": "run_bi_query",
                "description": "Run a business intelligence query across Deals and Work Orders boards.",
                "parameters": serde_json::to_value(schema.schema).unwrap_or_default(),
            }
        })
    }
}

/// The result envelope of one query. Every reachable path produces an
/// `Answer`; the legacy `Error` shape survives only for irrecoverable fetch
/// failure on the deals board. Callers must handle both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Answer { final_answer: String },
    Error { error: String },
}

impl QueryOutput {
    pub fn answer(text: impl Into<String>) -> Self {
        QueryOutput::Answer {
            final_answer: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        QueryOutput::Error { error: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type_wire_names() {
        assert_eq!(ColumnType::from("text".to_string()), ColumnType::Text);
        assert_eq!(ColumnType::from("status".to_string()), ColumnType::Status);
        assert_eq!(ColumnType::from("color".to_string()), ColumnType::Status);
        assert_eq!(ColumnType::from("numbers".to_string()), ColumnType::Numeric);
        assert_eq!(ColumnType::from("date".to_string()), ColumnType::Date);
        assert_eq!(
            ColumnType::from("board_relation".to_string()),
            ColumnType::Other("board_relation".to_string())
        );
    }

    #[test]
    fn test_payload_deserialization() {
        let raw = serde_json::json!({
            "data": {
                "boards": [{
                    "name": "Deals",
                    "columns": [
                        {"id": "text_x1", "title": "Sector", "type": "text"},
                        {"id": "num_y2", "title": "Deal Value", "type": "numbers"}
                    ],
                    "items_page": {
                        "items": [{
                            "id": "101",
                            "name": "Acme expansion",
                            "column_values": [
                                {"id": "text_x1", "text": "Manufacturing", "value": null},
                                {"id": "num_y2", "text": "10000", "value": "\"10000\""}
                            ]
                        }]
                    }
                }]
            }
        });

        let parsed: BoardResponse = serde_json::from_value(raw).unwrap();
        let boards = &parsed.data.unwrap().boards;
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].columns[1].column_type, ColumnType::Numeric);
        assert_eq!(boards[0].items_page.items[0].name, "Acme expansion");
    }

    #[test]
    fn test_error_envelope_deserialization() {
        let raw = serde_json::json!({
            "errors": [{"message": "Not Authenticated"}]
        });
        let parsed: BoardResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "Not Authenticated");
    }

    #[test]
    fn test_tool_definition_schema() {
        let def = BiQueryArgs::tool_definition();
        assert_eq!(def["function"]["name"], "run_bi_query");
        let params = def["function"]["parameters"].to_string();
        assert!(params.contains("sector"));
        assert!(params.contains("time_period"));
    }

    #[test]
    fn test_query_output_serialization() {
        let answer = QueryOutput::answer("All good");
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["final_answer"], "All good");

        let error = QueryOutput::error("Failed to fetch Deals data.");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["error"], "Failed to fetch Deals data.");
    }
}
