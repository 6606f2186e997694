//! `-o name` printer

use super::{PrintError, ResourcePrinter};
use crate::models::object::split_api_version;
use crate::table::Table;
use serde_json::Value;
use std::io::Write;

/// Prints `kind.group/name` per row
#[derive(Debug, Default)]
pub struct NamePrinter;

fn resource_name(object: &Value) -> String {
    let kind = object
        .get("kind")
        .and_then(|k| k.as_str())
        .unwrap_or_default()
        .to_lowercase();
    let group = object
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .map(|v| split_api_version(v).0)
        .unwrap_or_default();
    let name = object
        .get("metadata")
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default();

    match (kind.is_empty(), group.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => format!("{}/{}", kind, name),
        (false, false) => format!("{}.{}/{}", kind, group, name),
    }
}

impl ResourcePrinter for NamePrinter {
    fn print(&mut self, table: &Table, out: &mut dyn Write) -> Result<(), PrintError> {
        for row in &table.rows {
            writeln!(out, "{}", resource_name(&row.object))?;
        }
        Ok(())
    }
}
