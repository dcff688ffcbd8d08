//! Shallow structural sanity check of a function schema.
//!
//! This looks at the *schema*, not at data.  It is advisory: problems are
//! reported as `false` plus a `tracing::warn!` diagnostic, never as an error.

use serde_json::{Map, Value};
use tracing::warn;

/// Returns `true` when `schema` has the shape of a function schema:
///
/// * top-level `type` and `function` keys;
/// * `function` carries `name`, `description` and `parameters`;
/// * `parameters.type == "object"` with a `properties` mapping and a
///   `required` sequence;
/// * every property either has a `oneOf` whose options each carry a `type`,
///   or a `type` plus a `description`; objects need nested `properties`,
///   arrays need an `items` node with a `type` (or `oneOf`).
///
/// ```rust
/// use codebridge_core::lint::validate_schema_shape;
/// use serde_json::json;
///
/// assert!(!validate_schema_shape(&json!({"type": "function"})));
/// ```
pub fn validate_schema_shape(schema: &Value) -> bool {
    let Some(top) = schema.as_object() else {
        warn!("schema is not an object");
        return false;
    };
    if !has_keys(top, &["type", "function"]) {
        warn!("missing top-level keys");
        return false;
    }

    let Some(function) = top["function"].as_object() else {
        warn!("`function` is not an object");
        return false;
    };
    if !has_keys(function, &["name", "description", "parameters"]) {
        warn!("missing function keys");
        return false;
    }

    let parameters = &function["parameters"];
    if parameters.get("type").and_then(Value::as_str) != Some("object") {
        warn!("invalid parameters type");
        return false;
    }
    let Some(properties) = parameters.get("properties").and_then(Value::as_object) else {
        warn!("invalid properties");
        return false;
    };
    if !parameters.get("required").is_some_and(Value::is_array) {
        warn!("invalid required list");
        return false;
    }

    check_properties(properties)
}

fn check_properties(properties: &Map<String, Value>) -> bool {
    properties
        .iter()
        .all(|(name, details)| check_property(name, details))
}

fn check_property(name: &str, details: &Value) -> bool {
    if let Some(options) = details.get("oneOf") {
        return check_one_of(name, options);
    }

    if details.get("type").is_none() || details.get("description").is_none() {
        warn!(property = name, "invalid property, missing `type` or `description`");
        return false;
    }

    match details["type"].as_str() {
        Some("object") => match details.get("properties").and_then(Value::as_object) {
            Some(nested) => check_properties(nested),
            None => {
                warn!(property = name, "invalid nested properties");
                false
            }
        },
        Some("array") => check_items(name, details.get("items")),
        _ => true,
    }
}

fn check_one_of(name: &str, options: &Value) -> bool {
    let Some(options) = options.as_array() else {
        warn!(property = name, "`oneOf` is not a sequence");
        return false;
    };
    let valid = options.iter().all(|option| option.get("type").is_some());
    if !valid {
        warn!(property = name, "invalid `oneOf` option");
    }
    valid
}

fn check_items(name: &str, items: Option<&Value>) -> bool {
    let Some(items) = items.filter(|items| items.is_object()) else {
        warn!(property = name, "invalid items in array");
        return false;
    };

    if let Some(options) = items.get("oneOf") {
        return check_one_of(name, options);
    }
    match items.get("type").and_then(Value::as_str) {
        Some("object") => match items.get("properties").and_then(Value::as_object) {
            Some(nested) => check_properties(nested),
            None => {
                warn!(property = name, "invalid nested properties in array items");
                false
            }
        },
        Some("array") => check_items(name, items.get("items")),
        Some(_) => true,
        None => {
            warn!(property = name, "invalid item in array, missing `type`");
            false
        }
    }
}

fn has_keys(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().all(|key| map.contains_key(*key))
}
