//! Object sources
//!
//! An `ObjectSource` produces the objects a listing prints. `fetch` returns
//! them in retrieval order, with per-item failures inline so that one bad
//! object never hides the rest; `watch` opens a change stream for
//! continuous listings.
//!
//! Implementations:
//! - `crate::kube::KubeSource` - a live cluster
//! - `manifest::ManifestSource` - manifest files and in-memory objects

pub mod manifest;

pub use manifest::ManifestSource;

use crate::models::{NamespaceScope, QuerySpec, RetrievedObject, WatchEvent};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::path::PathBuf;

/// The source call itself failed; nothing can be listed
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("the server doesn't have a resource type \"{0}\"")]
    UnknownResource(String),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error parsing {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

/// One object could not be retrieved; the listing continues
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetrievalError {
    #[error("Error from server (NotFound): {resource} \"{name}\" not found")]
    NotFound { resource: String, name: String },

    #[error(
        "the namespace from the provided object \"{object_namespace}\" does not match the namespace \"{namespace}\". You must pass '--namespace={object_namespace}' to perform this operation."
    )]
    NamespaceMismatch {
        object_namespace: String,
        namespace: String,
    },

    #[error("Error from server ({reason}): {message}")]
    Api { reason: String, message: String },

    #[error("error decoding object: {0}")]
    Decode(String),

    #[error("watch error: {0}")]
    Watch(String),
}

impl RetrievalError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RetrievalError::NotFound { .. })
    }
}

/// Items returned by `ObjectSource::fetch`
pub type FetchResult = Vec<Result<RetrievedObject, RetrievalError>>;

/// Stream returned by `ObjectSource::watch`
pub type WatchStream = BoxStream<'static, Result<WatchEvent, RetrievalError>>;

/// Where listed objects come from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectSource: Send + Sync {
    /// Retrieve every object the query names, in retrieval order
    async fn fetch(&self, query: &QuerySpec) -> Result<FetchResult, SourceError>;

    /// Open a change stream for the query
    async fn watch(&self, query: &QuerySpec) -> Result<WatchStream, SourceError>;
}

const EXPORT_METADATA_FIELDS: &[&str] = &[
    "uid",
    "resourceVersion",
    "creationTimestamp",
    "selfLink",
    "managedFields",
    "generation",
];

/// Remove cluster-specific fields for `--export`
///
/// List wrappers have their items stripped as well.
pub fn strip_for_export(object: &mut Value) {
    if let Some(items) = object.get_mut("items").and_then(|i| i.as_array_mut()) {
        items.iter_mut().for_each(strip_for_export);
    }
    let Some(map) = object.as_object_mut() else {
        return;
    };
    if map.contains_key("items") {
        return;
    }
    map.remove("status");
    if let Some(metadata) = map.get_mut("metadata").and_then(|m| m.as_object_mut()) {
        for field in EXPORT_METADATA_FIELDS {
            metadata.remove(*field);
        }
    }
}

/// Build a retrieved object, reporting malformed payloads inline
pub(crate) fn retrieved(object: Value) -> Result<RetrievedObject, RetrievalError> {
    RetrievedObject::from_value(object).map_err(RetrievalError::Decode)
}

/// Reject objects whose namespace contradicts an explicit `--namespace`
pub(crate) fn check_namespace(
    scope: &NamespaceScope,
    object: &RetrievedObject,
) -> Result<RetrievedObject, RetrievalError> {
    if let (NamespaceScope::Single { namespace, explicit: true }, Some(actual)) =
        (scope, object.namespace.as_deref())
    {
        if namespace != actual {
            return Err(RetrievalError::NamespaceMismatch {
                object_namespace: actual.to_string(),
                namespace: namespace.clone(),
            });
        }
    }
    Ok(object.clone())
}
