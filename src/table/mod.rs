//! Table conversion
//!
//! Turns retrieved objects into a uniform tabular form:
//! - `registry` - kind-indexed dispatch to row converters
//! - `builtin` / `flux` - converters for the registered kinds
//! - `generic` - introspection fallback for every other kind
//! - `normalize` - legacy API version normalization
//! - `sort` - `--sort-by` ordering
//! - `jsonpath` / `format` - shared value and cell helpers

pub mod builtin;
pub mod flux;
pub mod format;
pub mod generic;
pub mod jsonpath;
pub mod normalize;
pub mod registry;
pub mod sort;

pub use normalize::{ApiVersionNormalizer, NormalizeError, Normalizer};
pub use registry::{KindConverter, KindRegistry, RowFn};

use crate::models::{ResourceKind, RetrievedObject, WatchEventKind};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Errors converting one object into a table
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("unable to decode {kind} \"{name}\": {source}")]
    Decode {
        kind: String,
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("{kind} list item {index} is not a JSON object")]
    InvalidListItem { kind: String, index: usize },
}

/// A column header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    /// 0 shows by default; anything higher only with `-o wide`
    pub priority: u8,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
        }
    }

    pub fn wide(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 1,
        }
    }
}

/// One row, with the object it was produced from
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub object: Value,
}

/// Tabular form of one retrieved object (or one list of them)
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<TableRow>,
    /// Watch event type when the table represents an event
    pub event: Option<WatchEventKind>,
}

impl Table {
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            event: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Prepend a NAMESPACE column filled from each row's object
    pub fn prepend_namespace_column(&mut self) {
        self.columns.insert(0, ColumnDefinition::new("NAMESPACE"));
        for row in &mut self.rows {
            let namespace = row
                .object
                .get("metadata")
                .and_then(|m| m.get("namespace"))
                .and_then(|n| n.as_str())
                .unwrap_or_default()
                .to_string();
            row.cells.insert(0, namespace);
        }
    }

    /// Prefix the NAME cells with `kind.group/`
    pub fn qualify_names(&mut self, object: &RetrievedObject) {
        let Some(index) = self.columns.iter().position(|c| c.name == "NAME") else {
            return;
        };
        let kind = object
            .kind
            .strip_suffix("List")
            .filter(|k| !k.is_empty())
            .unwrap_or(&object.kind)
            .to_lowercase();
        let prefix = if object.group().is_empty() {
            kind
        } else {
            format!("{}.{}", kind, object.group())
        };
        for row in &mut self.rows {
            if let Some(cell) = row.cells.get_mut(index) {
                *cell = format!("{}/{}", prefix, cell);
            }
        }
    }

    /// Mark the table as a watch event and prepend an EVENT column
    pub fn mark_event(&mut self, event: WatchEventKind, with_column: bool) {
        self.event = Some(event);
        if with_column {
            self.columns.insert(0, ColumnDefinition::new("EVENT"));
            for row in &mut self.rows {
                row.cells.insert(0, event.as_str().to_string());
            }
        }
    }
}

/// Rendering inputs that are not part of the object itself
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Reference time for AGE and other relative columns
    pub now: DateTime<Utc>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { now: Utc::now() }
    }
}

impl RenderOptions {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

/// Whether a table for this object gets a NAMESPACE column in
/// all-namespaces listings
pub fn is_namespaced_object(object: &RetrievedObject) -> bool {
    let base = object.kind.strip_suffix("List").unwrap_or(&object.kind);
    match ResourceKind::parse_optional(base) {
        Some(kind) => kind.is_namespaced(),
        None => {
            object.namespace.is_some()
                || object
                    .object
                    .get("items")
                    .and_then(|i| i.as_array())
                    .is_some_and(|items| {
                        items.iter().any(|item| {
                            item.get("metadata")
                                .and_then(|m| m.get("namespace"))
                                .and_then(|n| n.as_str())
                                .is_some_and(|n| !n.is_empty())
                        })
                    })
        }
    }
}
