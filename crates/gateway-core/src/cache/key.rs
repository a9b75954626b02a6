use serde_json::Value;

/// Builds the cache key for a query: `"{operation}:{variables}"`.
///
/// Variables are serialized through `serde_json::Value`, whose object map is ordered by key,
/// so two variable maps that differ only in insertion order produce the same key.
#[must_use]
pub fn cache_key(operation: &str, variables: &Value) -> String {
    let variables = match variables {
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    };
    format!("{operation}:{variables}")
}
