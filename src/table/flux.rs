//! Row converters for Flux resources
//!
//! Flux kinds are CRDs with no typed model here, so the rows are read
//! straight from the JSON payload. READY and STATUS come from the `Ready`
//! condition, matching the printer columns the Flux CRDs declare.

use super::format::{NONE, object_age};
use super::registry::KindConverter;
use super::{ColumnDefinition, ConversionError, RenderOptions, RowFn};
use crate::models::ResourceKind;
use serde_json::Value;

/// Ready condition summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadyStatus {
    pub ready: Option<bool>,
    pub message: Option<String>,
}

/// Extract the Ready condition from `status.conditions`
pub fn ready_condition(obj: &Value) -> ReadyStatus {
    let condition = obj
        .get("status")
        .and_then(|s| s.get("conditions"))
        .and_then(|c| c.as_array())
        .and_then(|conditions| {
            conditions
                .iter()
                .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("Ready"))
        });

    match condition {
        Some(condition) => ReadyStatus {
            ready: condition
                .get("status")
                .and_then(|s| s.as_str())
                .map(|s| s == "True"),
            message: condition
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
        },
        None => ReadyStatus::default(),
    }
}

/// `spec.suspend`, defaulting to false when absent
pub fn is_suspended(obj: &Value) -> bool {
    obj.get("spec")
        .and_then(|s| s.get("suspend"))
        .and_then(|s| s.as_bool())
        .unwrap_or(false)
}

/// Last applied (or fetched) revision
pub fn revision(obj: &Value) -> Option<&str> {
    let status = obj.get("status")?;
    status
        .get("lastAppliedRevision")
        .or_else(|| status.get("artifact").and_then(|a| a.get("revision")))
        .and_then(|r| r.as_str())
}

fn str_at<'a>(obj: &'a Value, path: &[&str]) -> &'a str {
    path.iter()
        .try_fold(obj, |current, key| current.get(key))
        .and_then(|v| v.as_str())
        .unwrap_or(NONE)
}

fn ready_cells(obj: &Value) -> [String; 2] {
    let status = ready_condition(obj);
    let ready = match status.ready {
        Some(true) => "True",
        Some(false) => "False",
        None => "Unknown",
    };
    [ready.to_string(), status.message.unwrap_or_default()]
}

fn bool_cell(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

fn name(obj: &Value) -> String {
    str_at(obj, &["metadata", "name"]).to_string()
}

fn git_repository_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("NAME"),
        ColumnDefinition::new("URL"),
        ColumnDefinition::new("AGE"),
        ColumnDefinition::new("READY"),
        ColumnDefinition::new("STATUS"),
        ColumnDefinition::wide("BRANCH"),
        ColumnDefinition::wide("REVISION"),
        ColumnDefinition::wide("SUSPENDED"),
    ]
}

fn git_repository_row(
    obj: &Value,
    options: &RenderOptions,
) -> Result<Vec<String>, ConversionError> {
    let [ready, message] = ready_cells(obj);
    Ok(vec![
        name(obj),
        str_at(obj, &["spec", "url"]).to_string(),
        object_age(obj, options.now),
        ready,
        message,
        str_at(obj, &["spec", "ref", "branch"]).to_string(),
        revision(obj).unwrap_or(NONE).to_string(),
        bool_cell(is_suspended(obj)),
    ])
}

fn kustomization_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("NAME"),
        ColumnDefinition::new("AGE"),
        ColumnDefinition::new("READY"),
        ColumnDefinition::new("STATUS"),
        ColumnDefinition::wide("PATH"),
        ColumnDefinition::wide("REVISION"),
        ColumnDefinition::wide("PRUNE"),
        ColumnDefinition::wide("SUSPENDED"),
    ]
}

fn kustomization_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let [ready, message] = ready_cells(obj);
    let prune = obj
        .get("spec")
        .and_then(|s| s.get("prune"))
        .and_then(|p| p.as_bool())
        .unwrap_or(false);
    Ok(vec![
        name(obj),
        object_age(obj, options.now),
        ready,
        message,
        str_at(obj, &["spec", "path"]).to_string(),
        revision(obj).unwrap_or(NONE).to_string(),
        bool_cell(prune),
        bool_cell(is_suspended(obj)),
    ])
}

fn helm_release_columns() -> Vec<ColumnDefinition> {
    vec![
        ColumnDefinition::new("NAME"),
        ColumnDefinition::new("AGE"),
        ColumnDefinition::new("READY"),
        ColumnDefinition::new("STATUS"),
        ColumnDefinition::wide("CHART"),
        ColumnDefinition::wide("VERSION"),
        ColumnDefinition::wide("REVISION"),
        ColumnDefinition::wide("SUSPENDED"),
    ]
}

fn helm_release_row(obj: &Value, options: &RenderOptions) -> Result<Vec<String>, ConversionError> {
    let [ready, message] = ready_cells(obj);
    let last_revision = obj
        .get("status")
        .and_then(|s| s.get("lastAttemptedRevision"))
        .and_then(|r| r.as_str())
        .or_else(|| revision(obj))
        .unwrap_or(NONE);
    Ok(vec![
        name(obj),
        object_age(obj, options.now),
        ready,
        message,
        str_at(obj, &["spec", "chart", "spec", "chart"]).to_string(),
        str_at(obj, &["spec", "chart", "spec", "version"]).to_string(),
        last_revision.to_string(),
        bool_cell(is_suspended(obj)),
    ])
}

/// Converter for a Flux kind, None for other kinds
pub fn converter(kind: ResourceKind) -> Option<KindConverter> {
    let (columns, convert) = match kind {
        ResourceKind::GitRepository => (git_repository_columns(), git_repository_row as RowFn),
        ResourceKind::Kustomization => (kustomization_columns(), kustomization_row as RowFn),
        ResourceKind::HelmRelease => (helm_release_columns(), helm_release_row as RowFn),
        _ => return None,
    };
    Some(KindConverter::new(kind.api_version(), columns, convert))
}
