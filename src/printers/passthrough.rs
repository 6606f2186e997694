//! JSON and YAML printers
//!
//! Objects are written as they were retrieved. A table with one row prints
//! the object itself; several rows print a `v1` `List`. With watch events,
//! every row is wrapped as `{type, object}`.

use super::{PrintError, ResourcePrinter};
use crate::table::Table;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// One printed document; fields serialize in kubectl's order
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Document<'a> {
    Object(&'a Value),
    List(ListDocument<'a>),
    Event(EventDocument<'a>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListDocument<'a> {
    api_version: &'static str,
    kind: &'static str,
    metadata: ListMeta,
    items: Vec<&'a Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListMeta {
    resource_version: &'static str,
}

#[derive(Debug, Serialize)]
struct EventDocument<'a> {
    #[serde(rename = "type")]
    event: &'static str,
    object: &'a Value,
}

/// Documents to print for one table
fn documents(table: &Table, wrap_events: bool) -> Vec<Document<'_>> {
    if let (Some(event), true) = (table.event, wrap_events) {
        return table
            .rows
            .iter()
            .map(|row| {
                Document::Event(EventDocument {
                    event: event.as_str(),
                    object: &row.object,
                })
            })
            .collect();
    }
    match table.rows.as_slice() {
        [] => Vec::new(),
        [row] => vec![Document::Object(&row.object)],
        rows => vec![Document::List(ListDocument {
            api_version: "v1",
            kind: "List",
            metadata: ListMeta {
                resource_version: "",
            },
            items: rows.iter().map(|r| &r.object).collect(),
        })],
    }
}

/// `-o json`
#[derive(Debug)]
pub struct JsonPrinter {
    wrap_events: bool,
}

impl JsonPrinter {
    pub fn new(wrap_events: bool) -> Self {
        Self { wrap_events }
    }
}

impl ResourcePrinter for JsonPrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError> {
        for document in documents(table, self.wrap_events) {
            let text =
                serde_json::to_string_pretty(&document).map_err(|e| PrintError::Serialize {
                    format: "json",
                    message: e.to_string(),
                })?;
            writeln!(out, "{}", text)?;
        }
        Ok(())
    }
}

/// `-o yaml`; documents after the first are separated by `---`
#[derive(Debug)]
pub struct YamlPrinter {
    wrap_events: bool,
    printed: usize,
}

impl YamlPrinter {
    /// `after_output` marks a printer that continues an existing stream
    pub fn new(wrap_events: bool, after_output: bool) -> Self {
        Self {
            wrap_events,
            printed: usize::from(after_output),
        }
    }
}

impl ResourcePrinter for YamlPrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError> {
        for document in documents(table, self.wrap_events) {
            let text = serde_yaml::to_string(&document).map_err(|e| PrintError::Serialize {
                format: "yaml",
                message: e.to_string(),
            })?;
            if self.printed > 0 {
                writeln!(out, "---")?;
            }
            out.write_all(text.as_bytes())?;
            self.printed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WatchEventKind;
    use crate::table::{ColumnDefinition, TableRow};
    use serde_json::json;

    fn table(names: &[&str]) -> Table {
        let mut table = Table::new(vec![ColumnDefinition::new("NAME")]);
        for name in names {
            table.rows.push(TableRow {
                cells: vec![name.to_string()],
                object: json!({"apiVersion": "v1", "kind": "Pod", "metadata": {"name": name}}),
            });
        }
        table
    }

    fn print(printer: &mut dyn ResourcePrinter, table: &Table) -> String {
        let mut out = Vec::new();
        printer.print(table, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_row_prints_object() {
        let out = print(&mut JsonPrinter::new(false), &table(&["a"]));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "Pod");
        assert_eq!(value["metadata"]["name"], "a");
    }

    #[test]
    fn test_multiple_rows_print_list() {
        let out = print(&mut JsonPrinter::new(false), &table(&["a", "b"]));
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["kind"], "List");
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["metadata"]["resourceVersion"], "");
        // Fields keep kubectl's order
        assert!(out.find("\"kind\"").unwrap() < out.find("\"items\"").unwrap());
    }

    #[test]
    fn test_watch_events_are_wrapped() {
        let mut events = table(&["a"]);
        events.event = Some(WatchEventKind::Deleted);
        let out = print(&mut JsonPrinter::new(true), &events);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "DELETED");
        assert_eq!(value["object"]["metadata"]["name"], "a");
    }

    #[test]
    fn test_yaml_separates_documents() {
        let mut printer = YamlPrinter::new(false, false);
        let first = print(&mut printer, &table(&["a"]));
        let second = print(&mut printer, &table(&["b"]));
        assert!(!first.starts_with("---"));
        assert!(second.starts_with("---\n"));
        assert!(second.contains("name: b"));

        let mut continuing = YamlPrinter::new(false, true);
        assert!(print(&mut continuing, &table(&["c"])).starts_with("---\n"));
    }
}
