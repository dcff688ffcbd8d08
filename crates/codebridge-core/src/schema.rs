//! Output shapes of the schema builder.
//!
//! These structs serialize to exactly the JSON that function-calling APIs
//! expect, so a [`FunctionSchema`] can be embedded into a request payload
//! as-is.  They also deserialize, which lets the validator work on schemas
//! that were stored or received as JSON.

use std::fmt::Display;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

/// JSON type keyword of a schema node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SchemaType {
    Boolean,
    String,
    Integer,
    Number,
    Array,
    Object,
}

impl Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaType::Boolean => write!(f, "boolean"),
            SchemaType::String => write!(f, "string"),
            SchemaType::Integer => write!(f, "integer"),
            SchemaType::Number => write!(f, "number"),
            SchemaType::Array => write!(f, "array"),
            SchemaType::Object => write!(f, "object"),
        }
    }
}

/// A single node of a generated schema.
///
/// A node built by [`crate::builder`] carries either `type` or `one_of`,
/// never both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enumeration: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// `Some(Value::Null)` is a real `null` default, distinct from "none".
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

impl SchemaNode {
    /// A node with only its `type` set.
    pub fn typed(kind: SchemaType) -> Self {
        Self {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }
}

/// The `parameters` object of a function schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub kind: SchemaType,
    pub properties: IndexMap<String, SchemaNode>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self {
            kind: SchemaType::Object,
            properties: IndexMap::new(),
            required: Vec::new(),
        }
    }
}

impl ParameterSchema {
    /// View the parameter object as an ordinary object node.
    pub fn as_node(&self) -> SchemaNode {
        SchemaNode {
            kind: Some(self.kind),
            properties: Some(self.properties.clone()),
            required: Some(self.required.clone()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Function,
}

/// The body of a [`FunctionSchema`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    /// Only serialized when `true`; synchronous callables omit the key.
    #[serde(rename = "async", default, skip_serializing_if = "is_false")]
    pub is_async: bool,
}

/// `{"type": "function", "function": {...}}`, the tool description handed
/// to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    #[serde(rename = "type")]
    pub kind: ToolType,
    pub function: FunctionSpec,
}

impl FunctionSchema {
    pub fn new(function: FunctionSpec) -> Self {
        Self {
            kind: ToolType::Function,
            function,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn parameters(&self) -> &ParameterSchema {
        &self.function.parameters
    }

    pub fn to_value(&self) -> crate::error::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn deserialize_some<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
