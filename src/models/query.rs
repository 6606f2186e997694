//! Query specification
//!
//! Describes which objects a listing should fetch. A `QuerySpec` is built once
//! from command-line arguments and handed read-only to the object source.

use super::selector::{Selector, SelectorError};
use std::path::PathBuf;

/// Errors building a query from user input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("You must specify the type of resource to get.")]
    MissingResourceType,

    #[error(
        "there is no need to specify a resource type as a separate argument when passing arguments in resource/name form (e.g. 'kget get resource/<resource_name>' instead of 'kget get resource resource/<resource_name>')"
    )]
    MixedResourceNameForms,

    #[error("arguments in resource/name form must have a single resource and name: \"{0}\"")]
    InvalidResourceName(String),

    #[error("cannot combine resource arguments with --filename")]
    ArgumentsWithFilenames,

    #[error("invalid label selector: {0}")]
    LabelSelector(SelectorError),

    #[error("invalid field selector: {0}")]
    FieldSelector(SelectorError),
}

/// Namespace scope of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceScope {
    /// Every namespace
    All,
    /// A single namespace; `explicit` is true when the user named it rather
    /// than inheriting it from the client configuration
    Single { namespace: String, explicit: bool },
}

impl NamespaceScope {
    /// Namespace to send with namespaced requests (None for all namespaces)
    pub fn namespace(&self) -> Option<&str> {
        match self {
            NamespaceScope::All => None,
            NamespaceScope::Single { namespace, .. } => Some(namespace),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, NamespaceScope::Single { explicit: true, .. })
    }
}

/// A resource type with optional explicit names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Resource token as typed by the user: kind, plural or alias
    pub resource: String,
    /// Explicit names; empty means "list everything matching"
    pub names: Vec<String>,
}

/// Immutable description of what to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub namespace: NamespaceScope,
    pub label_selector: Option<Selector>,
    pub field_selector: Option<Selector>,
    pub resources: Vec<ResourceRef>,
    pub filenames: Vec<PathBuf>,
    pub recursive: bool,
    pub export: bool,
}

impl QuerySpec {
    /// Build a query from positional arguments and flags
    ///
    /// Positional arguments follow the usual forms:
    /// `TYPE`, `TYPE NAME...`, `TYPE1,TYPE2 [NAME...]` or `TYPE/NAME...`.
    pub fn from_args(
        args: &[String],
        filenames: Vec<PathBuf>,
        namespace: NamespaceScope,
        label_selector: Option<&str>,
        field_selector: Option<&str>,
    ) -> Result<Self, QueryError> {
        if !args.is_empty() && !filenames.is_empty() {
            return Err(QueryError::ArgumentsWithFilenames);
        }
        let resources = if filenames.is_empty() {
            parse_resource_args(args)?
        } else {
            Vec::new()
        };

        let label_selector = label_selector
            .filter(|s| !s.trim().is_empty())
            .map(Selector::parse_labels)
            .transpose()
            .map_err(QueryError::LabelSelector)?;
        let field_selector = field_selector
            .filter(|s| !s.trim().is_empty())
            .map(Selector::parse_fields)
            .transpose()
            .map_err(QueryError::FieldSelector)?;

        Ok(Self {
            namespace,
            label_selector,
            field_selector,
            resources,
            filenames,
            recursive: false,
            export: false,
        })
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    /// Whether every object is addressed by an explicit name (or file)
    pub fn is_explicit_names(&self) -> bool {
        if !self.filenames.is_empty() {
            return true;
        }
        !self.resources.is_empty() && self.resources.iter().all(|r| !r.names.is_empty())
    }

    /// Whether the request is exactly one named object of one type
    pub fn is_single_item(&self) -> bool {
        self.filenames.is_empty()
            && self.resources.len() == 1
            && self.resources[0].names.len() == 1
    }

    /// Whether results can span several resource types
    pub fn spans_multiple_types(&self) -> bool {
        if !self.filenames.is_empty() {
            return true;
        }
        let mut types: Vec<&str> = self.resources.iter().map(|r| r.resource.as_str()).collect();
        types.sort_unstable();
        types.dedup();
        types.len() > 1
    }
}

/// Parse positional resource arguments into resource references
pub fn parse_resource_args(args: &[String]) -> Result<Vec<ResourceRef>, QueryError> {
    let Some(first) = args.first() else {
        return Err(QueryError::MissingResourceType);
    };

    let slash_forms = args.iter().filter(|a| a.contains('/')).count();
    if slash_forms > 0 {
        if slash_forms != args.len() {
            return Err(QueryError::MixedResourceNameForms);
        }
        let mut refs: Vec<ResourceRef> = Vec::new();
        for arg in args {
            let (resource, name) = arg
                .split_once('/')
                .filter(|(r, n)| !r.is_empty() && !n.is_empty() && !n.contains('/'))
                .ok_or_else(|| QueryError::InvalidResourceName(arg.clone()))?;
            // Consecutive names of the same type share one reference
            match refs.last_mut() {
                Some(last) if last.resource == resource => last.names.push(name.to_string()),
                _ => refs.push(ResourceRef {
                    resource: resource.to_string(),
                    names: vec![name.to_string()],
                }),
            }
        }
        return Ok(refs);
    }

    let names: Vec<String> = args[1..].to_vec();
    let refs: Vec<ResourceRef> = first
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|resource| ResourceRef {
            resource: resource.to_string(),
            names: names.clone(),
        })
        .collect();

    if refs.is_empty() {
        return Err(QueryError::MissingResourceType);
    }
    Ok(refs)
}
