pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Keys under which a result carries its per-row listing.
const ROW_KEYS: [&str; 4] = ["rows", "identifiers", "comparisons", "years"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Find the row listing in a result object, looking one level down
/// (a mortgage keeps its rows under `schedule`).
pub(crate) fn primary_rows(result: &Map<String, Value>) -> Option<&[Value]> {
    for key in ROW_KEYS {
        if let Some(Value::Array(rows)) = result.get(key) {
            return Some(rows);
        }
    }
    result.values().find_map(|v| match v {
        Value::Object(inner) => ROW_KEYS.iter().find_map(|k| match inner.get(*k) {
            Some(Value::Array(rows)) => Some(rows.as_slice()),
            _ => None,
        }),
        _ => None,
    })
}
