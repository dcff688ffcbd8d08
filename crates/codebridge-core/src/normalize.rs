//! Presentational key ordering for generated schemas.

use serde_json::{Map, Value};

/// Move `description` to the front of every schema node.
///
/// Applies to the function body, the parameter node, each property node,
/// `items` and every `oneOf` option.  The relative order of all other keys
/// is kept, and property maps themselves are never reordered.
///
/// ```rust
/// use codebridge_core::normalize::normalize_key_order;
/// use serde_json::json;
///
/// let node = normalize_key_order(json!({"type": "string", "description": "Name"}));
/// let keys: Vec<_> = node.as_object().unwrap().keys().cloned().collect();
/// assert_eq!(keys, ["description", "type"]);
/// ```
pub fn normalize_key_order(schema: Value) -> Value {
    match schema {
        Value::Object(node) => Value::Object(reorder_node(node)),
        other => other,
    }
}

fn reorder_node(mut node: Map<String, Value>) -> Map<String, Value> {
    let mut ordered = Map::with_capacity(node.len());
    if let Some(description) = node.remove("description") {
        ordered.insert("description".to_owned(), description);
    }

    for (key, value) in node {
        let value = match (key.as_str(), value) {
            ("function" | "parameters" | "items", value) => normalize_key_order(value),
            ("properties", Value::Object(properties)) => Value::Object(
                properties
                    .into_iter()
                    .map(|(name, child)| (name, normalize_key_order(child)))
                    .collect(),
            ),
            ("oneOf", Value::Array(options)) => {
                Value::Array(options.into_iter().map(normalize_key_order).collect())
            }
            (_, value) => value,
        };
        ordered.insert(key, value);
    }
    ordered
}
