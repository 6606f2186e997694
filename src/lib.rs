//! kget library
//!
//! This library provides the listing pipeline behind the `kget` binary:
//! objects are retrieved from a cluster or manifest files, converted to
//! tables by kind and streamed to a writer in groups. It can be used both as
//! a binary and as a library for testing.

pub mod cli;
pub mod config;
pub mod kube;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod printers;
pub mod source;
pub mod table;

// Re-export commonly used types for convenience
pub use models::{
    NamespaceScope, QuerySpec, ResourceKind, ResourceRef, RetrievedObject, WatchEvent,
    WatchEventKind,
};
pub use pipeline::{AggregateError, GetError, GetRunner, OutputOptions, RunSummary};
pub use source::{ManifestSource, ObjectSource, RetrievalError, SourceError};
pub use table::{KindRegistry, Table};
