//! Model layer
//!
//! Types shared by every stage of a listing:
//! - `query` - what to fetch (`QuerySpec`)
//! - `object` - what was fetched (`RetrievedObject`, `WatchEvent`)
//! - `selector` - label and field selectors
//! - `resource_kind` - kinds with a dedicated row converter

pub mod object;
pub mod query;
pub mod resource_kind;
pub mod selector;

pub use object::{RetrievedObject, WatchEvent, WatchEventKind};
pub use query::{NamespaceScope, QueryError, QuerySpec, ResourceRef};
pub use resource_kind::ResourceKind;
pub use selector::{Selector, SelectorError};
