//! Field masks
//!
//! A mask is an ordered set of top-level keys removed from a document before
//! it is written or after it is read. Masks are computed per call from
//! [`MaskRule`]s, small predicates keyed by field name, so the same rule set
//! can drop different keys depending on the document's shape.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A resource document: one JSON object, opaque to the synchronizer
pub type Document = Map<String, Value>;

/// Ordered set of keys to strip from a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    keys: Vec<String>,
}

impl FieldMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mask from keys, dropping duplicates but keeping first-seen order
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut mask = Self::new();
        for key in keys {
            mask.insert(key);
        }
        mask
    }

    /// Add a key; returns false if it was already present
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.keys.push(key);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Remove every masked key present in `doc`, returning the removed keys.
    /// Keys not in the mask are untouched.
    pub fn apply(&self, doc: &mut Document) -> Vec<String> {
        self.keys
            .iter()
            .filter(|key| doc.remove(key.as_str()).is_some())
            .cloned()
            .collect()
    }
}

/// When a rule drops its key
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Whenever the key is present
    #[default]
    Always,
    /// When the value is null, "", [] or {}
    Empty,
    /// When the value has no non-empty member with this name,
    /// e.g. a `threshold` object whose `field` list is empty
    EmptyField(String),
    /// When the value is present and not empty
    NonEmpty,
}

impl Condition {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Always => true,
            Self::Empty => is_empty_value(value),
            Self::EmptyField(member) => value.get(member).map_or(true, is_empty_value),
            Self::NonEmpty => !is_empty_value(value),
        }
    }
}

/// A single masking rule from the resource registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MaskRule {
    pub key: String,
    #[serde(default)]
    pub when: Condition,
    /// Reported to the caller whenever the rule fires
    #[serde(default)]
    pub warning: Option<String>,
}

impl MaskRule {
    pub fn always(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            when: Condition::Always,
            warning: None,
        }
    }

    pub fn when(key: impl Into<String>, when: Condition) -> Self {
        Self {
            key: key.into(),
            when,
            warning: None,
        }
    }
}

/// Mask computed for one document, with the warnings of the rules that fired
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaskPlan {
    pub mask: FieldMask,
    pub warnings: Vec<String>,
}

pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Evaluate rules against a document. Only keys present in `doc` end up in
/// the mask.
pub fn evaluate(rules: &[MaskRule], doc: &Document) -> MaskPlan {
    let mut plan = MaskPlan::default();

    for rule in rules {
        let Some(value) = doc.get(&rule.key) else {
            continue;
        };
        if rule.when.matches(value) && plan.mask.insert(rule.key.as_str()) {
            if let Some(warning) = &rule.warning {
                plan.warnings.push(warning.clone());
            }
        }
    }

    plan
}

/// Evaluate rules and strip the matching keys in one pass
pub fn strip(rules: &[MaskRule], doc: &mut Document) -> MaskPlan {
    let plan = evaluate(rules, doc);
    plan.mask.apply(doc);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_mask_removes_only_present_keys() {
        let mut d = doc(json!({"a": 1, "b": 2, "c": 3}));
        let removed = FieldMask::from_keys(["a", "z"]).apply(&mut d);
        assert_eq!(removed, vec!["a".to_string()]);
        assert_eq!(Value::Object(d), json!({"b": 2, "c": 3}));
    }

    #[test]
    fn test_from_keys_deduplicates() {
        let mask = FieldMask::from_keys(["id", "created_at", "id"]);
        assert_eq!(mask.keys(), &["id".to_string(), "created_at".to_string()]);
    }

    #[test]
    fn test_empty_threshold_is_dropped() {
        let rules = vec![MaskRule::when("threshold", Condition::EmptyField("field".into()))];

        let mut d = doc(json!({"name": "N", "threshold": {}}));
        strip(&rules, &mut d);
        assert!(!d.contains_key("threshold"));

        let mut d = doc(json!({"name": "N", "threshold": {"field": [], "value": 10}}));
        strip(&rules, &mut d);
        assert!(!d.contains_key("threshold"));

        let mut d = doc(json!({"name": "N", "threshold": {"field": ["host.name"], "value": 10}}));
        strip(&rules, &mut d);
        assert!(d.contains_key("threshold"));
    }

    #[test]
    fn test_empty_list_is_dropped() {
        let rules = vec![MaskRule::when("exceptions_list", Condition::Empty)];

        let mut d = doc(json!({"exceptions_list": null}));
        assert_eq!(strip(&rules, &mut d).mask.keys(), &["exceptions_list".to_string()]);

        let mut d = doc(json!({"exceptions_list": [{"id": "x"}]}));
        assert!(strip(&rules, &mut d).mask.is_empty());
    }

    #[test]
    fn test_non_empty_rule_reports_warning() {
        let rules = vec![MaskRule {
            key: "comments".into(),
            when: Condition::NonEmpty,
            warning: Some("comments unsupported".into()),
        }];

        let mut d = doc(json!({"comments": [{"comment": "hi"}]}));
        let plan = strip(&rules, &mut d);
        assert_eq!(plan.warnings, vec!["comments unsupported".to_string()]);
        assert!(d.is_empty());

        let mut d = doc(json!({"comments": []}));
        let plan = strip(&rules, &mut d);
        assert!(plan.warnings.is_empty());
        assert!(d.contains_key("comments"));
    }

    #[test]
    fn test_condition_deserializes_from_registry_syntax() {
        let rules: Vec<MaskRule> = serde_json::from_value(json!([
            {"key": "created_at"},
            {"key": "exceptions_list", "when": "empty"},
            {"key": "threshold", "when": {"empty_field": "field"}}
        ]))
        .unwrap();
        assert_eq!(rules[0].when, Condition::Always);
        assert_eq!(rules[1].when, Condition::Empty);
        assert_eq!(rules[2].when, Condition::EmptyField("field".into()));
    }

    #[test]
    fn test_numbers_and_bools_are_never_empty() {
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(is_empty_value(&json!("")));
    }
}
