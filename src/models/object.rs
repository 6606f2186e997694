//! Retrieved objects and watch events
//!
//! A `RetrievedObject` is the unit handed from an object source to the
//! listing pipeline: the raw JSON payload plus the identity fields the
//! pipeline reads on every step.

use kube::core::GroupVersionKind;
use serde_json::Value;
use std::fmt;

/// An object fetched from a source, ready for conversion
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedObject {
    pub api_version: String,
    pub kind: String,
    pub namespace: Option<String>,
    pub name: String,
    pub object: Value,
}

impl RetrievedObject {
    /// Build a retrieved object from a JSON payload
    ///
    /// The payload must be a JSON object carrying `apiVersion` and `kind`.
    /// List wrappers (`PodList`, `List`) have no name; they get an empty one.
    pub fn from_value(object: Value) -> Result<Self, String> {
        let map = object
            .as_object()
            .ok_or_else(|| "object payload is not a JSON object".to_string())?;

        let api_version = map
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "object has no apiVersion".to_string())?
            .to_string();
        let kind = map
            .get("kind")
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "object has no kind".to_string())?
            .to_string();

        let metadata = map.get("metadata");
        let name = metadata
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_string();
        let namespace = metadata
            .and_then(|m| m.get("namespace"))
            .and_then(|n| n.as_str())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Self {
            api_version,
            kind,
            namespace,
            name,
            object,
        })
    }

    /// API group, empty for the core group
    pub fn group(&self) -> &str {
        split_api_version(&self.api_version).0
    }

    /// API version without the group
    pub fn version(&self) -> &str {
        split_api_version(&self.api_version).1
    }

    /// Key deciding when output has to restart with a new printer
    pub fn grouping_key(&self) -> GroupVersionKind {
        GroupVersionKind::gvk(self.group(), self.version(), &self.kind)
    }

    /// `kind.group/name`, the form used by the name printer and for
    /// multi-type listings (e.g. `deployment.apps/web`, `pod/nginx`)
    pub fn qualified_name(&self) -> String {
        let kind = self.kind.to_lowercase();
        if self.group().is_empty() {
            format!("{}/{}", kind, self.name)
        } else {
            format!("{}.{}/{}", kind, self.group(), self.name)
        }
    }
}

/// Split `group/version` into its parts; the core group has no slash
pub fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Join a group and version into an `apiVersion` string
pub fn join_api_version(group: &str, version: &str) -> String {
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{}/{}", group, version)
    }
}

/// Type of a change observed while watching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Added,
    Modified,
    Deleted,
}

impl WatchEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchEventKind::Added => "ADDED",
            WatchEventKind::Modified => "MODIFIED",
            WatchEventKind::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for WatchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object change delivered by a watching source
#[derive(Debug, Clone, PartialEq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub object: RetrievedObject,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, object: RetrievedObject) -> Self {
        Self { kind, object }
    }
}
