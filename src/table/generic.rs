//! Generic table conversion
//!
//! Fallback for kinds without a registered converter. Columns are derived
//! from the objects themselves: NAME, scalar top-level fields, AGE, then the
//! structured top-level fields as wide-only compact JSON.

use super::format::{MAX_CELL_WIDTH, NONE, object_age, truncate_value};
use super::jsonpath::value_to_display;
use super::{ColumnDefinition, RenderOptions, Table, TableRow};
use serde_json::Value;

/// Top-level fields that are identity, not content
const SKIPPED_FIELDS: &[&str] = &["apiVersion", "kind", "metadata"];

/// Convert objects of one (unregistered) kind into a table
///
/// Never fails: any JSON object yields a row, and non-object payloads yield
/// a row with only a name placeholder.
pub fn convert(objects: &[Value], options: &RenderOptions) -> Table {
    let mut scalar_fields: Vec<&str> = Vec::new();
    let mut structured_fields: Vec<&str> = Vec::new();

    for obj in objects {
        let Some(map) = obj.as_object() else {
            continue;
        };
        for (key, value) in map {
            if SKIPPED_FIELDS.contains(&key.as_str()) {
                continue;
            }
            let bucket = if is_structured(value) {
                &mut structured_fields
            } else {
                &mut scalar_fields
            };
            if !bucket.contains(&key.as_str()) {
                bucket.push(key.as_str());
            }
        }
    }
    // A key structured in one object and scalar in another is shown as wide
    scalar_fields.retain(|key| !structured_fields.contains(key));
    scalar_fields.sort_unstable();
    structured_fields.sort_unstable();

    let mut columns = vec![ColumnDefinition::new("NAME")];
    columns.extend(scalar_fields.iter().map(|key| ColumnDefinition::new(header_name(key))));
    columns.push(ColumnDefinition::new("AGE"));
    columns.extend(
        structured_fields
            .iter()
            .map(|key| ColumnDefinition::wide(header_name(key))),
    );

    let mut table = Table::new(columns);
    for obj in objects {
        let name = obj
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or(NONE)
            .to_string();

        let mut cells = Vec::with_capacity(table.columns.len());
        cells.push(name);
        cells.extend(scalar_fields.iter().map(|key| cell(obj.get(*key))));
        cells.push(object_age(obj, options.now));
        cells.extend(structured_fields.iter().map(|key| cell(obj.get(*key))));

        table.rows.push(TableRow {
            cells,
            object: obj.clone(),
        });
    }
    table
}

fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(value) => truncate_value(&value_to_display(value), MAX_CELL_WIDTH),
        None => NONE.to_string(),
    }
}

/// `replicaCount` -> `REPLICA-COUNT`
pub fn header_name(field: &str) -> String {
    let mut header = String::with_capacity(field.len() + 4);
    let mut prev_lower = false;
    for ch in field.chars() {
        if ch.is_uppercase() && prev_lower {
            header.push('-');
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        header.extend(ch.to_uppercase());
    }
    header
}
