//! Request and result models shared by the dispatcher and the adapter.

use super::Operation;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Tool parameters: parameter name to JSON value.
///
/// After the dispatcher's validation stage every value is known to match its
/// declared type, so the typed getters simply return `None` for anything absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build params from a JSON value. Anything other than an object (or null)
    /// yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            Value::Null => Some(Self::new()),
            _ => None,
        }
    }

    /// Builder-style insert, handy in tests and examples.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Drop parameters whose value is JSON null; they count as not provided.
    pub fn strip_nulls(&mut self) {
        self.0.retain(|_, v| !v.is_null());
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get_str(name).map(str::to_string)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// A boolean that counts as false when absent.
    pub fn flag(&self, name: &str) -> bool {
        self.get_bool(name).unwrap_or(false)
    }

    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        self.get(name)?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    /// Tags as key/value pairs, sorted by key.
    pub fn get_tags(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.get(name)?
            .as_object()?
            .iter()
            .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
    }

    pub fn get_parameters(&self, name: &str) -> Option<Vec<ParameterChange>> {
        serde_json::from_value(self.get(name)?.clone()).ok()
    }

    pub fn get_timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        parse_timestamp(self.get_str(name)?)
    }

    /// Canonical serialization of the parameters, excluding `exclude`.
    ///
    /// Object keys are sorted at every level, so two parameter sets that differ
    /// only in key order produce the same fingerprint.
    pub fn fingerprint(&self, exclude: &str) -> String {
        let canonical: BTreeMap<&String, Value> = self
            .0
            .iter()
            .filter(|(k, _)| k.as_str() != exclude)
            .map(|(k, v)| (k, canonicalize(v)))
            .collect();
        serde_json::to_string(&canonical).unwrap_or_default()
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            serde_json::to_value(sorted).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Parse an RFC 3339 timestamp such as `2024-05-01T12:00:00Z`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// A single parameter group change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParameterChange {
    /// Parameter name, e.g. "max_connections"
    pub name: String,
    /// New value. Omit when resetting a parameter to its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// "immediate" or "pending-reboot"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_method: Option<String>,
}

/// A tool invocation as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    pub operation: Operation,
    pub params: Params,
}

impl ToolRequest {
    pub fn new(operation: Operation, params: Params) -> Self {
        Self { operation, params }
    }
}

/// Successful tool outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// A resource document, or `{items, count}` for list operations
    pub data: Value,
    /// Present for list operations only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

impl ToolResult {
    /// Items of a list result. Empty for single-resource results.
    pub fn items(&self) -> &[Value] {
        self.data
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_nulls() {
        let mut params = Params::new().with("a", 1).with("b", Value::Null);
        params.strip_nulls();
        assert!(params.contains("a"));
        assert!(!params.contains("b"));
    }

    #[test]
    fn test_fingerprint_ignores_key_order_and_excluded() {
        let a = Params::from_value(json!({
            "db_cluster_identifier": "c1",
            "tags": {"b": "2", "a": "1"},
            "confirmation_token": "cfm_x"
        }))
        .unwrap();
        let b = Params::from_value(json!({
            "tags": {"a": "1", "b": "2"},
            "db_cluster_identifier": "c1"
        }))
        .unwrap();
        assert_eq!(
            a.fingerprint("confirmation_token"),
            b.fingerprint("confirmation_token")
        );
    }

    #[test]
    fn test_fingerprint_changes_with_values() {
        let a = Params::new().with("skip_final_snapshot", true);
        let b = Params::new().with("skip_final_snapshot", false);
        assert_ne!(a.fingerprint(""), b.fingerprint(""));
    }

    #[test]
    fn test_typed_getters() {
        let params = Params::from_value(json!({
            "port": 5432,
            "multi_az": true,
            "vpc_security_group_ids": ["sg-1", "sg-2"],
            "tags": {"env": "dev"},
            "restore_to_time": "2024-05-01T12:00:00Z",
            "parameters": [{"name": "max_connections", "value": "200"}]
        }))
        .unwrap();

        assert_eq!(params.get_i32("port"), Some(5432));
        assert!(params.flag("multi_az"));
        assert!(!params.flag("missing"));
        assert_eq!(
            params.get_string_list("vpc_security_group_ids").unwrap(),
            vec!["sg-1", "sg-2"]
        );
        assert_eq!(
            params.get_tags("tags").unwrap(),
            vec![("env".to_string(), "dev".to_string())]
        );
        assert_eq!(
            params.get_timestamp("restore_to_time").unwrap().timestamp(),
            1_714_564_800
        );
        let changes = params.get_parameters("parameters").unwrap();
        assert_eq!(changes[0].name, "max_connections");
        assert_eq!(changes[0].value.as_deref(), Some("200"));
        assert!(changes[0].apply_method.is_none());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Params::from_value(json!([1, 2])).is_none());
        assert!(Params::from_value(Value::Null).unwrap().is_empty());
    }
}
