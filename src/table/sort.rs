//! `--sort-by` ordering
//!
//! Values at the sort path compare by type: numbers numerically, strings
//! lexically, booleans false before true, anything else (or mixed types) by
//! its rendered form. Objects missing the value sort last. Sorting is stable.

use super::jsonpath::{extract_jsonpath_value, value_to_display};
use super::{Table, TableRow};
use crate::models::RetrievedObject;
use serde_json::Value;
use std::cmp::Ordering;

/// Compare two optional sort values
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(a)), Some(Value::Number(b))) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(a), Some(b)) => value_to_display(a).cmp(&value_to_display(b)),
    }
}

/// Stable-sort table rows by the value at `path` in each row's object
pub fn sort_rows(rows: &mut [TableRow], path: &str) {
    rows.sort_by(|a, b| {
        compare_values(
            extract_jsonpath_value(&a.object, path),
            extract_jsonpath_value(&b.object, path),
        )
    });
}

/// Stable-sort a table's rows in place
pub fn sort_table(table: &mut Table, path: &str) {
    sort_rows(&mut table.rows, path);
}

/// Stable-sort retrieved objects by the value at `path`
pub fn sort_objects(objects: &mut [RetrievedObject], path: &str) {
    objects.sort_by(|a, b| {
        compare_values(
            extract_jsonpath_value(&a.object, path),
            extract_jsonpath_value(&b.object, path),
        )
    });
}
