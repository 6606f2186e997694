//! API version normalization
//!
//! Converters decode one API version per kind. Objects served (or written in
//! manifests) at an older version are rewritten into that version before
//! conversion. Only versions registered as legacy for the kind are accepted;
//! a kind is never normalized across to a different group's schema.

use crate::models::object::join_api_version;
use crate::models::{ResourceKind, RetrievedObject};
use kube::core::GroupVersionKind;
use serde_json::{Map, Value, json};

/// Normalization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("{kind} in version \"{from}\" cannot be handled as a {kind} in version \"{to}\"")]
    UnsupportedVersion {
        kind: String,
        from: String,
        to: String,
    },

    #[error("failed to convert {kind} \"{name}\" to \"{to}\": {message}")]
    Conversion {
        kind: String,
        name: String,
        to: String,
        message: String,
    },
}

/// Rewrites an object into a target group/version
#[cfg_attr(test, mockall::automock)]
pub trait Normalizer: Send + Sync {
    fn normalize(
        &self,
        object: &RetrievedObject,
        target: &GroupVersionKind,
    ) -> Result<RetrievedObject, NormalizeError>;
}

/// Default normalizer for the legacy versions of the built-in kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiVersionNormalizer;

impl Normalizer for ApiVersionNormalizer {
    fn normalize(
        &self,
        object: &RetrievedObject,
        target: &GroupVersionKind,
    ) -> Result<RetrievedObject, NormalizeError> {
        let to = join_api_version(&target.group, &target.version);
        let unsupported = || NormalizeError::UnsupportedVersion {
            kind: object.kind.clone(),
            from: object.api_version.clone(),
            to: to.clone(),
        };

        if object.api_version == to {
            return Ok(object.clone());
        }
        let kind = ResourceKind::parse_optional(&object.kind)
            .filter(|kind| kind.as_str() == target.kind && kind.api_version() == to)
            .ok_or_else(unsupported)?;
        if !kind.legacy_api_versions().contains(&object.api_version.as_str()) {
            return Err(unsupported());
        }

        let mut value = object.object.clone();
        let map = value.as_object_mut().ok_or_else(unsupported)?;
        map.insert("apiVersion".to_string(), Value::String(to.clone()));

        match kind {
            ResourceKind::Deployment
            | ResourceKind::DaemonSet
            | ResourceKind::ReplicaSet
            | ResourceKind::StatefulSet => default_selector_from_template(map),
            ResourceKind::Ingress if object.api_version.ends_with("v1beta1") => {
                convert_ingress_backends(map)
            }
            _ => {}
        }

        RetrievedObject::from_value(value).map_err(|message| NormalizeError::Conversion {
            kind: object.kind.clone(),
            name: object.name.clone(),
            to,
            message,
        })
    }
}

/// Older workload versions defaulted `spec.selector` from the pod template
/// labels; `apps/v1` requires it.
fn default_selector_from_template(map: &mut Map<String, Value>) {
    let Some(spec) = map.get_mut("spec").and_then(|s| s.as_object_mut()) else {
        return;
    };
    if spec.contains_key("selector") {
        return;
    }
    let labels = spec
        .get("template")
        .and_then(|t| t.get("metadata"))
        .and_then(|m| m.get("labels"))
        .cloned();
    if let Some(labels) = labels {
        spec.insert("selector".to_string(), json!({ "matchLabels": labels }));
    }
}

/// `serviceName`/`servicePort` backends become `service.{name,port}`, and
/// `spec.backend` becomes `spec.defaultBackend`.
fn convert_ingress_backends(map: &mut Map<String, Value>) {
    let Some(spec) = map.get_mut("spec").and_then(|s| s.as_object_mut()) else {
        return;
    };

    if let Some(backend) = spec.remove("backend") {
        spec.insert("defaultBackend".to_string(), convert_backend(backend));
    }

    let Some(rules) = spec.get_mut("rules").and_then(|r| r.as_array_mut()) else {
        return;
    };
    for rule in rules {
        let Some(paths) = rule
            .get_mut("http")
            .and_then(|h| h.get_mut("paths"))
            .and_then(|p| p.as_array_mut())
        else {
            continue;
        };
        for path in paths {
            let Some(path) = path.as_object_mut() else {
                continue;
            };
            if let Some(backend) = path.remove("backend") {
                path.insert("backend".to_string(), convert_backend(backend));
            }
            path.entry("pathType")
                .or_insert_with(|| Value::String("ImplementationSpecific".to_string()));
        }
    }
}

fn convert_backend(backend: Value) -> Value {
    let Some(service_name) = backend.get("serviceName").cloned() else {
        return backend;
    };
    let port = match backend.get("servicePort") {
        Some(Value::Number(n)) => json!({ "number": n }),
        Some(Value::String(s)) => match s.parse::<i64>() {
            Ok(n) => json!({ "number": n }),
            Err(_) => json!({ "name": s }),
        },
        _ => json!({}),
    };
    json!({ "service": { "name": service_name, "port": port } })
}
