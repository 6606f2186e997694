//! JSONPath evaluation
//!
//! Supports the subset used by `--sort-by`, `custom-columns` and field
//! selectors:
//! - `.field` / `field` - object field
//! - `.field.subfield` - nested access
//! - `[index]` - array access, also inside a segment (`items[0].name`)
//! - `{.field}` - template braces are accepted and stripped

use serde_json::Value;

/// Extract a value from a JSON object using a JSONPath expression
pub fn extract_jsonpath_value<'a>(obj: &'a Value, path: &str) -> Option<&'a Value> {
    let path = normalize_path(path);
    let mut current = obj;

    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }

        let (field, mut indexes) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };

        if !field.is_empty() {
            current = current.get(field)?;
        }

        while let Some(rest) = indexes.strip_prefix('[') {
            let close = rest.find(']')?;
            let index = rest[..close].trim().parse::<usize>().ok()?;
            current = current.as_array()?.get(index)?;
            indexes = &rest[close + 1..];
        }
        if !indexes.is_empty() {
            return None;
        }
    }

    Some(current)
}

/// Strip template braces and surrounding whitespace: `{.a.b}` -> `.a.b`
pub fn normalize_path(path: &str) -> &str {
    let path = path.trim();
    path.strip_prefix('{')
        .and_then(|p| p.strip_suffix('}'))
        .unwrap_or(path)
        .trim()
}

/// Render a JSON value as a table cell
pub fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "<none>".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_jsonpath_simple() {
        let obj = json!({"name": "test", "status": "ready"});
        assert_eq!(extract_jsonpath_value(&obj, ".name"), Some(&json!("test")));
        assert_eq!(extract_jsonpath_value(&obj, "status"), Some(&json!("ready")));
        assert_eq!(extract_jsonpath_value(&obj, ".missing"), None);
    }

    #[test]
    fn test_extract_jsonpath_nested_and_braced() {
        let obj = json!({"metadata": {"name": "web", "labels": {"app": "web"}}});
        assert_eq!(
            extract_jsonpath_value(&obj, "{.metadata.name}"),
            Some(&json!("web"))
        );
        assert_eq!(
            extract_jsonpath_value(&obj, ".metadata.labels.app"),
            Some(&json!("web"))
        );
    }

    #[test]
    fn test_extract_jsonpath_array() {
        let obj = json!({
            "spec": {"containers": [{"name": "app", "ports": [80, 443]}]}
        });
        assert_eq!(
            extract_jsonpath_value(&obj, ".spec.containers[0].name"),
            Some(&json!("app"))
        );
        assert_eq!(
            extract_jsonpath_value(&obj, ".spec.containers[0].ports[1]"),
            Some(&json!(443))
        );
        assert_eq!(extract_jsonpath_value(&obj, ".spec.containers[3]"), None);
        assert_eq!(extract_jsonpath_value(&obj, ".spec.containers[x]"), None);
    }

    #[test]
    fn test_empty_path_is_root() {
        let obj = json!({"a": 1});
        assert_eq!(extract_jsonpath_value(&obj, ""), Some(&obj));
    }

    #[test]
    fn test_value_to_display() {
        assert_eq!(value_to_display(&json!("x")), "x");
        assert_eq!(value_to_display(&json!(3)), "3");
        assert_eq!(value_to_display(&json!(true)), "true");
        assert_eq!(value_to_display(&Value::Null), "<none>");
        assert_eq!(value_to_display(&json!({"a": 1})), "{\"a\":1}");
    }
}
