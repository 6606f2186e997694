//! Kind registry
//!
//! Maps a declared kind to the converter that turns it into table rows.
//! The registry is populated once at startup with the built-in kinds and
//! stays open for `register`; kinds without an entry go through the generic
//! converter, so conversion is total over JSON-object payloads.

use super::normalize::Normalizer;
use super::{
    ColumnDefinition, ConversionError, RenderOptions, Table, TableRow, builtin, flux, generic,
};
use crate::models::object::split_api_version;
use crate::models::{ResourceKind, RetrievedObject};
use kube::core::GroupVersionKind;
use serde_json::Value;
use std::collections::HashMap;

/// Row converter: one object payload to one row of cells
pub type RowFn = fn(&Value, &RenderOptions) -> Result<Vec<String>, ConversionError>;

/// A registered converter and the column schema it fills
#[derive(Debug, Clone)]
pub struct KindConverter {
    /// API version of the shape `convert` expects
    pub api_version: String,
    pub columns: Vec<ColumnDefinition>,
    pub convert: RowFn,
}

impl KindConverter {
    pub fn new(
        api_version: impl Into<String>,
        columns: Vec<ColumnDefinition>,
        convert: RowFn,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            columns,
            convert,
        }
    }
}

/// Kind-indexed dispatch table
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    converters: HashMap<String, KindConverter>,
}

impl KindRegistry {
    /// Empty registry: every kind uses the generic converter
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a converter for every `ResourceKind`
    pub fn with_builtin_kinds() -> Self {
        let mut registry = Self::new();
        for kind in ResourceKind::all() {
            if let Some(converter) = builtin::converter(*kind).or_else(|| flux::converter(*kind)) {
                registry.register(kind.as_str(), converter);
            }
        }
        registry
    }

    /// Register (or replace) the converter for a kind
    pub fn register(&mut self, kind: impl Into<String>, converter: KindConverter) {
        self.converters.insert(kind.into(), converter);
    }

    /// Converter registered for a kind (case-sensitive)
    pub fn get(&self, kind: &str) -> Option<&KindConverter> {
        self.converters.get(kind)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.converters.contains_key(kind)
    }

    /// Registered kinds, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Convert one retrieved object (or `<Kind>List`) into a table
    ///
    /// A registered kind whose apiVersion differs from its converter's is
    /// normalized against the kind's own group/version first.
    pub fn convert(
        &self,
        object: &RetrievedObject,
        options: &RenderOptions,
        normalizer: &dyn Normalizer,
    ) -> Result<Table, ConversionError> {
        let (item_kind, items) = match list_items(object)? {
            Some((kind, items)) => (kind, items),
            None => (object.kind.clone(), vec![object.clone()]),
        };

        match self.get(&item_kind) {
            Some(converter) => {
                tracing::debug!(
                    "Converting {} {} object(s) with registered converter",
                    items.len(),
                    item_kind
                );
                let mut table = Table::new(converter.columns.clone());
                for item in items {
                    let item = normalize_item(item, converter, normalizer)?;
                    let cells = (converter.convert)(&item.object, options)?;
                    table.rows.push(TableRow {
                        cells,
                        object: item.object,
                    });
                }
                Ok(table)
            }
            None => {
                tracing::debug!(
                    "No converter registered for {}, using generic columns",
                    item_kind
                );
                let values: Vec<Value> = items.into_iter().map(|i| i.object).collect();
                Ok(generic::convert(&values, options))
            }
        }
    }
}

fn normalize_item(
    item: RetrievedObject,
    converter: &KindConverter,
    normalizer: &dyn Normalizer,
) -> Result<RetrievedObject, ConversionError> {
    if item.api_version == converter.api_version {
        return Ok(item);
    }
    let (group, version) = split_api_version(&converter.api_version);
    let target = GroupVersionKind::gvk(group, version, &item.kind);
    tracing::debug!(
        "Normalizing {} {} from {} to {}",
        item.kind,
        item.name,
        item.api_version,
        converter.api_version
    );
    Ok(normalizer.normalize(&item, &target)?)
}

/// Split a list wrapper into its item kind and items
///
/// Items inherit `apiVersion` and `kind` from a `<Kind>List`. A bare `List`
/// dispatches on its items' kind when they all share one.
pub fn list_items(
    object: &RetrievedObject,
) -> Result<Option<(String, Vec<RetrievedObject>)>, ConversionError> {
    let Some(prefix) = object.kind.strip_suffix("List") else {
        return Ok(None);
    };
    let Some(raw_items) = object.object.get("items").and_then(|i| i.as_array()) else {
        return Ok(None);
    };

    let mut items = Vec::with_capacity(raw_items.len());
    for (index, raw) in raw_items.iter().enumerate() {
        let mut value = raw.clone();
        let map = value
            .as_object_mut()
            .ok_or_else(|| ConversionError::InvalidListItem {
                kind: object.kind.clone(),
                index,
            })?;
        if !prefix.is_empty() {
            map.entry("apiVersion")
                .or_insert_with(|| Value::String(object.api_version.clone()));
            map.entry("kind")
                .or_insert_with(|| Value::String(prefix.to_string()));
        }
        let item = RetrievedObject::from_value(value).map_err(|_| {
            ConversionError::InvalidListItem {
                kind: object.kind.clone(),
                index,
            }
        })?;
        items.push(item);
    }

    let kind = if prefix.is_empty() {
        let mut kinds = items.iter().map(|i| i.kind.as_str());
        match kinds.next() {
            Some(first) if kinds.all(|k| k == first) => first.to_string(),
            _ => String::new(),
        }
    } else {
        prefix.to_string()
    };
    Ok(Some((kind, items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::normalize::{MockNormalizer, NormalizeError};
    use serde_json::json;

    fn object(value: Value) -> RetrievedObject {
        RetrievedObject::from_value(value).unwrap()
    }

    fn strict_normalizer() -> MockNormalizer {
        let mut normalizer = MockNormalizer::new();
        normalizer.expect_normalize().never();
        normalizer
    }

    #[test]
    fn test_builtin_registry_covers_every_resource_kind() {
        let registry = KindRegistry::with_builtin_kinds();
        for kind in ResourceKind::all() {
            assert!(registry.is_registered(kind.as_str()), "{} missing", kind);
            assert_eq!(
                registry.get(kind.as_str()).unwrap().api_version,
                kind.api_version()
            );
        }
        assert_eq!(registry.kinds().len(), ResourceKind::all().len());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = KindRegistry::with_builtin_kinds();
        assert!(registry.get("Pod").is_some());
        assert!(registry.get("pod").is_none());
    }

    #[test]
    fn test_unregistered_kind_uses_generic_converter() {
        let registry = KindRegistry::new();
        let table = registry
            .convert(
                &object(json!({"apiVersion": "example.com/v1", "kind": "Widget",
                               "metadata": {"name": "w1"}, "size": 3})),
                &RenderOptions::default(),
                &strict_normalizer(),
            )
            .unwrap();
        assert_eq!(table.columns[0].name, "NAME");
        assert_eq!(table.rows[0].cells[0], "w1");
    }

    #[test]
    fn test_kind_list_items_inherit_identity() {
        let registry = KindRegistry::with_builtin_kinds();
        let list = object(json!({
            "apiVersion": "v1",
            "kind": "ConfigMapList",
            "metadata": {"resourceVersion": "10"},
            "items": [
                {"metadata": {"name": "a"}, "data": {"k": "v"}},
                {"metadata": {"name": "b"}}
            ]
        }));
        let table = registry
            .convert(&list, &RenderOptions::default(), &strict_normalizer())
            .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].cells[0], "a");
        assert_eq!(table.rows[0].cells[1], "1");
        assert_eq!(table.rows[1].object["kind"], "ConfigMap");
    }

    #[test]
    fn test_mismatched_version_is_normalized() {
        let registry = KindRegistry::with_builtin_kinds();
        let mut normalizer = MockNormalizer::new();
        normalizer
            .expect_normalize()
            .withf(|obj, target| {
                obj.api_version == "extensions/v1beta1"
                    && target.group == "apps"
                    && target.version == "v1"
                    && target.kind == "Deployment"
            })
            .times(1)
            .returning(|obj, _| {
                let mut value = obj.object.clone();
                value["apiVersion"] = json!("apps/v1");
                value["spec"]["selector"] = json!({"matchLabels": {"app": "web"}});
                value["spec"]["template"] = json!({"spec": {"containers": []}});
                Ok(RetrievedObject::from_value(value).unwrap())
            });

        let table = registry
            .convert(
                &object(json!({"apiVersion": "extensions/v1beta1", "kind": "Deployment",
                               "metadata": {"name": "web"}, "spec": {}})),
                &RenderOptions::default(),
                &normalizer,
            )
            .unwrap();
        assert_eq!(table.rows[0].cells[0], "web");
    }

    #[test]
    fn test_normalization_failure_is_conversion_error() {
        let registry = KindRegistry::with_builtin_kinds();
        let mut normalizer = MockNormalizer::new();
        normalizer.expect_normalize().returning(|obj, target| {
            Err(NormalizeError::UnsupportedVersion {
                kind: obj.kind.clone(),
                from: obj.api_version.clone(),
                to: format!("{}/{}", target.group, target.version),
            })
        });

        let err = registry
            .convert(
                &object(json!({"apiVersion": "apps/v9", "kind": "Deployment",
                               "metadata": {"name": "web"}})),
                &RenderOptions::default(),
                &normalizer,
            )
            .unwrap_err();
        assert!(matches!(err, ConversionError::Normalize(_)));
    }

    #[test]
    fn test_custom_registration_overrides_generic() {
        fn widget_row(obj: &Value, _: &RenderOptions) -> Result<Vec<String>, ConversionError> {
            Ok(vec![obj["metadata"]["name"].as_str().unwrap_or("").to_uppercase()])
        }

        let mut registry = KindRegistry::new();
        registry.register(
            "Widget",
            KindConverter::new("example.com/v1", vec![ColumnDefinition::new("NAME")], widget_row),
        );
        let table = registry
            .convert(
                &object(json!({"apiVersion": "example.com/v1", "kind": "Widget",
                               "metadata": {"name": "w1"}})),
                &RenderOptions::default(),
                &strict_normalizer(),
            )
            .unwrap();
        assert_eq!(table.rows[0].cells, vec!["W1"]);
    }
}
