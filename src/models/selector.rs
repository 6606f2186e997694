//! Label and field selectors
//!
//! Selectors are conjunctions of requirements. Label selectors support the
//! set-based operators (`in`, `notin`, existence); field selectors only
//! support equality and inequality, matching what the API server accepts.
//!
//! Parsed selectors are rendered back with `Display` for the API request and
//! can also be evaluated locally (used by the manifest source).

use crate::table::jsonpath::{extract_jsonpath_value, value_to_display};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Selector requirement operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// One `key op values` requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub key: String,
    pub operator: Operator,
    pub values: Vec<String>,
}

impl Requirement {
    fn matches(&self, actual: Option<&str>) -> bool {
        match self.operator {
            Operator::Equals => actual == self.values.first().map(String::as_str),
            Operator::NotEquals => actual != self.values.first().map(String::as_str),
            Operator::In => actual.is_some_and(|a| self.values.iter().any(|v| v == a)),
            Operator::NotIn => !actual.is_some_and(|a| self.values.iter().any(|v| v == a)),
            Operator::Exists => actual.is_some(),
            Operator::DoesNotExist => actual.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => write!(f, "{}={}", self.key, self.values[0]),
            Operator::NotEquals => write!(f, "{}!={}", self.key, self.values[0]),
            Operator::In => write!(f, "{} in ({})", self.key, self.values.join(",")),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, self.values.join(",")),
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
        }
    }
}

/// Selector parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("invalid selector requirement \"{0}\"")]
    InvalidRequirement(String),

    #[error("unterminated value list in selector \"{0}\"")]
    UnterminatedList(String),

    #[error("field selector \"{0}\" only supports '=', '==' and '!='")]
    UnsupportedFieldOperator(String),
}

/// A conjunction of requirements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub requirements: Vec<Requirement>,
}

impl Selector {
    /// Parse a label selector (e.g. `app=web,tier in (fe,be),!canary`)
    pub fn parse_labels(input: &str) -> Result<Self, SelectorError> {
        let requirements = split_requirements(input)?
            .into_iter()
            .map(parse_requirement)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { requirements })
    }

    /// Parse a field selector (e.g. `metadata.name=web,status.phase!=Running`)
    pub fn parse_fields(input: &str) -> Result<Self, SelectorError> {
        let selector = Self::parse_labels(input)?;
        for requirement in &selector.requirements {
            if !matches!(requirement.operator, Operator::Equals | Operator::NotEquals) {
                return Err(SelectorError::UnsupportedFieldOperator(
                    requirement.to_string(),
                ));
            }
        }
        Ok(selector)
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Evaluate against an object's labels
    pub fn matches_labels(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|r| r.matches(labels.get(&r.key).map(String::as_str)))
    }

    /// Evaluate against an object's fields, addressed by dotted path
    pub fn matches_fields(&self, object: &Value) -> bool {
        self.requirements.iter().all(|r| {
            let actual = extract_jsonpath_value(object, &r.key).map(value_to_display);
            r.matches(actual.as_deref())
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

/// Split on commas that are not inside a parenthesised value list
fn split_requirements(input: &str) -> Result<Vec<&str>, SelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(SelectorError::UnterminatedList(input.to_string()));
    }
    parts.push(&input[start..]);

    Ok(parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect())
}

fn parse_requirement(raw: &str) -> Result<Requirement, SelectorError> {
    let invalid = || SelectorError::InvalidRequirement(raw.to_string());

    if let Some(key) = raw.strip_prefix('!') {
        let key = key.trim();
        if !valid_key(key) {
            return Err(invalid());
        }
        return Ok(Requirement {
            key: key.to_string(),
            operator: Operator::DoesNotExist,
            values: Vec::new(),
        });
    }

    // Longest operators first so "==" is not read as "=" followed by "=value"
    for (token, operator) in [
        ("!=", Operator::NotEquals),
        ("==", Operator::Equals),
        ("=", Operator::Equals),
    ] {
        if let Some((key, value)) = raw.split_once(token) {
            let key = key.trim();
            if !valid_key(key) {
                return Err(invalid());
            }
            return Ok(Requirement {
                key: key.to_string(),
                operator,
                values: vec![value.trim().to_string()],
            });
        }
    }

    for (token, operator) in [(" notin ", Operator::NotIn), (" in ", Operator::In)] {
        if let Some((key, list)) = raw.split_once(token) {
            let key = key.trim();
            let list = list
                .trim()
                .strip_prefix('(')
                .and_then(|l| l.strip_suffix(')'))
                .ok_or_else(invalid)?;
            let values: Vec<String> = list
                .split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
            if !valid_key(key) || values.is_empty() {
                return Err(invalid());
            }
            return Ok(Requirement {
                key: key.to_string(),
                operator,
                values,
            });
        }
    }

    if valid_key(raw) {
        return Ok(Requirement {
            key: raw.to_string(),
            operator: Operator::Exists,
            values: Vec::new(),
        });
    }

    Err(invalid())
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_equality_requirements() {
        let selector = Selector::parse_labels("app=web, tier==frontend,env!=prod").unwrap();
        assert_eq!(selector.requirements.len(), 3);
        assert_eq!(selector.requirements[1].operator, Operator::Equals);
        assert_eq!(selector.requirements[2].operator, Operator::NotEquals);
        assert_eq!(selector.to_string(), "app=web,tier=frontend,env!=prod");
    }

    #[test]
    fn test_parse_set_based_requirements() {
        let selector = Selector::parse_labels("tier in (fe, be),env notin (dev),canary,!legacy")
            .unwrap();
        let ops: Vec<Operator> = selector.requirements.iter().map(|r| r.operator).collect();
        assert_eq!(
            ops,
            vec![
                Operator::In,
                Operator::NotIn,
                Operator::Exists,
                Operator::DoesNotExist
            ]
        );
        assert_eq!(selector.requirements[0].values, vec!["fe", "be"]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Selector::parse_labels("tier in (fe"),
            Err(SelectorError::UnterminatedList(_))
        ));
        assert!(Selector::parse_labels("=value").is_err());
        assert!(matches!(
            Selector::parse_fields("metadata.name in (a)"),
            Err(SelectorError::UnsupportedFieldOperator(_))
        ));
    }

    #[test]
    fn test_matches_labels() {
        let selector = Selector::parse_labels("app=web,tier in (fe,be),!canary").unwrap();
        assert!(selector.matches_labels(&labels(&[("app", "web"), ("tier", "fe")])));
        assert!(!selector.matches_labels(&labels(&[("app", "web"), ("tier", "db")])));
        assert!(!selector.matches_labels(&labels(&[
            ("app", "web"),
            ("tier", "be"),
            ("canary", "true")
        ])));
    }

    #[test]
    fn test_not_equals_matches_missing_label() {
        let selector = Selector::parse_labels("env!=prod").unwrap();
        assert!(selector.matches_labels(&BTreeMap::new()));
    }

    #[test]
    fn test_matches_fields() {
        let pod = json!({
            "metadata": {"name": "web-1", "namespace": "default"},
            "status": {"phase": "Running"}
        });
        let selector = Selector::parse_fields("metadata.name=web-1,status.phase!=Failed").unwrap();
        assert!(selector.matches_fields(&pod));

        let selector = Selector::parse_fields("status.phase=Pending").unwrap();
        assert!(!selector.matches_fields(&pod));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector = Selector::parse_labels("").unwrap();
        assert!(selector.is_empty());
        assert!(selector.matches_labels(&BTreeMap::new()));
    }
}
