//! Manifest-backed object source
//!
//! Serves objects read from manifest files (`kget get --local -f FILE`) or
//! handed over in memory. Names, namespaces and selectors are applied
//! locally. `watch` replays a configured list of events and then ends.

use super::{
    FetchResult, ObjectSource, RetrievalError, SourceError, WatchStream, check_namespace, retrieved,
};
use crate::models::{
    NamespaceScope, QuerySpec, ResourceKind, ResourceRef, RetrievedObject, WatchEvent,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// Objects loaded up front and served from memory
#[derive(Debug, Clone, Default)]
pub struct ManifestSource {
    entries: Vec<Result<RetrievedObject, RetrievalError>>,
    events: Vec<WatchEvent>,
}

impl ManifestSource {
    /// Serve the given payloads; malformed ones become inline errors
    pub fn from_objects(objects: Vec<Value>) -> Self {
        Self {
            entries: objects.into_iter().map(retrieved).collect(),
            events: Vec::new(),
        }
    }

    /// Serve every object in the given manifest files
    pub fn from_files(paths: &[PathBuf], recursive: bool) -> Result<Self, SourceError> {
        Ok(Self::from_objects(load_manifests(paths, recursive)?))
    }

    /// Events replayed by `watch`
    pub fn with_events(mut self, events: Vec<WatchEvent>) -> Self {
        self.events = events;
        self
    }

    /// Append an item that fails to retrieve
    pub fn with_failure(mut self, error: RetrievalError) -> Self {
        self.entries.push(Err(error));
        self
    }

    fn objects(&self) -> impl Iterator<Item = &RetrievedObject> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    fn fetch_files(&self, query: &QuerySpec) -> FetchResult {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Ok(object) if !matches_selectors(query, object) => None,
                Ok(object) => Some(check_namespace(&query.namespace, object)),
                Err(e) => Some(Err(e.clone())),
            })
            .collect()
    }

    fn fetch_resource(
        &self,
        query: &QuerySpec,
        resource: &ResourceRef,
    ) -> Result<FetchResult, SourceError> {
        let known = ResourceKind::from_str_case_insensitive(&resource.resource).is_some();
        if !known && !self.objects().any(|o| kind_matches(&resource.resource, &o.kind)) {
            return Err(SourceError::UnknownResource(resource.resource.clone()));
        }

        let in_scope = |object: &&RetrievedObject| {
            kind_matches(&resource.resource, &object.kind)
                && namespace_matches(&query.namespace, object)
        };

        if resource.names.is_empty() {
            return Ok(self
                .objects()
                .filter(in_scope)
                .filter(|o| matches_selectors(query, o))
                .cloned()
                .map(Ok)
                .collect());
        }

        Ok(resource
            .names
            .iter()
            .map(|name| {
                self.objects()
                    .filter(in_scope)
                    .find(|o| &o.name == name)
                    .cloned()
                    .ok_or_else(|| RetrievalError::NotFound {
                        resource: plural_of(&resource.resource),
                        name: name.clone(),
                    })
            })
            .collect())
    }

    fn event_matches(&self, query: &QuerySpec, event: &WatchEvent) -> bool {
        let object = &event.object;
        if !matches_selectors(query, object) {
            return false;
        }
        if query.resources.is_empty() {
            return true;
        }
        query.resources.iter().any(|r| {
            kind_matches(&r.resource, &object.kind)
                && namespace_matches(&query.namespace, object)
                && (r.names.is_empty() || r.names.contains(&object.name))
        })
    }
}

#[async_trait]
impl ObjectSource for ManifestSource {
    async fn fetch(&self, query: &QuerySpec) -> Result<FetchResult, SourceError> {
        if query.resources.is_empty() {
            return Ok(self.fetch_files(query));
        }
        let mut items = Vec::new();
        for resource in &query.resources {
            items.extend(self.fetch_resource(query, resource)?);
        }
        Ok(items)
    }

    async fn watch(&self, query: &QuerySpec) -> Result<WatchStream, SourceError> {
        let events: Vec<_> = self
            .events
            .iter()
            .filter(|e| self.event_matches(query, e))
            .cloned()
            .map(Ok)
            .collect();
        tracing::debug!("Replaying {} watch events", events.len());
        Ok(futures::stream::iter(events).boxed())
    }
}

/// Read every object from manifest files and directories
///
/// Directories contribute their `.yaml`, `.yml` and `.json` files in name
/// order, descending into subdirectories when `recursive` is set. Files may
/// hold several YAML documents; `List` documents are flattened.
pub fn load_manifests(paths: &[PathBuf], recursive: bool) -> Result<Vec<Value>, SourceError> {
    let mut files = Vec::new();
    for path in paths {
        collect_files(path, recursive, true, &mut files)?;
    }

    let mut objects = Vec::new();
    for file in &files {
        objects.extend(read_manifest(file)?);
    }
    tracing::debug!(
        "Loaded {} objects from {} manifest files",
        objects.len(),
        files.len()
    );
    Ok(objects)
}

fn collect_files(
    path: &Path,
    recursive: bool,
    top_level: bool,
    files: &mut Vec<PathBuf>,
) -> Result<(), SourceError> {
    let read_error = |source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    };
    if !path.is_dir() {
        // Explicitly named files are read whatever their extension
        if top_level || has_manifest_extension(path) {
            files.push(path.to_path_buf());
        }
        return Ok(());
    }
    if !top_level && !recursive {
        return Ok(());
    }

    let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(read_error)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(read_error)?;
    entries.sort();
    for entry in entries {
        collect_files(&entry, recursive, false, files)?;
    }
    Ok(())
}

fn has_manifest_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MANIFEST_EXTENSIONS.contains(&e))
}

/// Parse every document of a manifest file
fn read_manifest(path: &Path) -> Result<Vec<Value>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut objects = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document).map_err(|e| SourceError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match value {
            Value::Null => {}
            Value::Object(_) => flatten_list(value, &mut objects),
            _ => {
                return Err(SourceError::Parse {
                    path: path.to_path_buf(),
                    message: "document is not an object".to_string(),
                });
            }
        }
    }
    Ok(objects)
}

fn flatten_list(value: Value, objects: &mut Vec<Value>) {
    let is_list = value
        .get("kind")
        .and_then(|k| k.as_str())
        .is_some_and(|k| k.ends_with("List"));
    match (is_list, value.get("items").and_then(|i| i.as_array())) {
        (true, Some(items)) => {
            for item in items.clone() {
                flatten_list(item, objects);
            }
        }
        _ => objects.push(value),
    }
}

/// Whether a command-line resource token names this kind
fn kind_matches(token: &str, kind: &str) -> bool {
    if let Some(resolved) = ResourceKind::from_str_case_insensitive(token) {
        return resolved.as_str() == kind;
    }
    let token = token.to_lowercase();
    let kind = kind.to_lowercase();
    token == kind || token == format!("{}s", kind) || token == format!("{}es", kind)
}

fn plural_of(token: &str) -> String {
    match ResourceKind::from_str_case_insensitive(token) {
        Some(kind) => kind.plural().to_string(),
        None => token.to_lowercase(),
    }
}

fn namespace_matches(scope: &NamespaceScope, object: &RetrievedObject) -> bool {
    match (scope.namespace(), object.namespace.as_deref()) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => true,
    }
}

fn labels_of(object: &RetrievedObject) -> BTreeMap<String, String> {
    object
        .object
        .get("metadata")
        .and_then(|m| m.get("labels"))
        .and_then(|l| l.as_object())
        .map(|labels| {
            labels
                .iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn matches_selectors(query: &QuerySpec, object: &RetrievedObject) -> bool {
    let labels_ok = query
        .label_selector
        .as_ref()
        .is_none_or(|s| s.matches_labels(&labels_of(object)));
    let fields_ok = query
        .field_selector
        .as_ref()
        .is_none_or(|s| s.matches_fields(&object.object));
    labels_ok && fields_ok
}
