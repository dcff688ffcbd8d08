//! Checking candidate data (typically LLM-produced tool arguments) against a
//! previously generated [`FunctionSchema`].
//!
//! The schema is compiled once into a [`Validator`]; every call to
//! [`Validator::validate`] then walks the candidate and collects **all**
//! violations, each with the dotted / indexed path of the offending value.
//!
//! Policy decisions:
//!
//! * integral floats (`30.0`) are accepted where an integer is expected and
//!   normalised to `30` (see [`ValidatorOptions::coerce_integral_floats`]);
//! * booleans are never integers or numbers, and numeric strings are never
//!   parsed;
//! * undeclared properties are neither rejected nor removed.
//!
//! ```rust
//! use codebridge_core::builder::build_function_schema;
//! use codebridge_core::descriptor::{CallableMeta, Constraints, FieldMeta, Param, TypeDescriptor};
//! use codebridge_core::validate::validate;
//! use serde_json::json;
//!
//! let schema = build_function_schema(
//!     &CallableMeta::new("create_user"),
//!     &[
//!         Param::required("name", TypeDescriptor::string()),
//!         Param::required(
//!             "age",
//!             TypeDescriptor::integer()
//!                 .annotated(FieldMeta::default().with_constraints(Constraints::default().ge(0))),
//!         ),
//!     ],
//! )?;
//!
//! assert!(validate(&json!({"name": "John", "age": 30}), &schema)?.is_valid());
//!
//! let error = validate(&json!({"age": -1}), &schema)?.into_result().unwrap_err();
//! let paths: Vec<String> = error.violations.iter().map(|v| v.path.to_string()).collect();
//! assert_eq!(paths, ["name", "age"]);
//! # Ok::<(), codebridge_core::error::SchemaError>(())
//! ```

use std::{cmp::Ordering, fmt};

use indexmap::IndexMap;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::{
    error::{Result, SchemaError},
    schema::{FunctionSchema, SchemaNode, SchemaType},
};

/// Result of validating a candidate value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// The candidate conforms; carries the normalised data.
    Valid(Value),
    /// The candidate does not conform; carries every violation found.
    Invalid(ValidationError),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }

    pub fn into_result(self) -> std::result::Result<Value, ValidationError> {
        match self {
            ValidationOutcome::Valid(value) => Ok(value),
            ValidationOutcome::Invalid(error) => Err(error),
        }
    }
}

/// Aggregate of all field-level violations for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A single reason why the candidate does not match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub path: FieldPath,
    pub message: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required property is absent.
    Missing,
    /// The value has the wrong JSON type (including an unexpected `null`).
    Type,
    /// The value is not one of the allowed enum values.
    Enum,
    /// A numeric bound is violated.
    Range,
    /// A string is too short or too long.
    Length,
    /// A string does not match the required pattern.
    Pattern,
    /// None of the `oneOf` variants matched.
    NoMatch,
}

/// Location of a value inside the candidate, e.g. `objects[1].property_one`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Key(String),
    Index(usize),
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn key(&self, key: &str) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Key(key.to_owned()));
        path
    }

    fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Index(index));
        path
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Knobs of the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Accept floats without a fractional part where an integer is expected,
    /// normalising them to integers.
    pub coerce_integral_floats: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            coerce_integral_floats: true,
        }
    }
}

impl ValidatorOptions {
    pub fn with_coerce_integral_floats(mut self, coerce: bool) -> Self {
        self.coerce_integral_floats = coerce;
        self
    }
}

/// Compile `schema` and validate `candidate` against it in one go.
pub fn validate(candidate: &Value, schema: &FunctionSchema) -> Result<ValidationOutcome> {
    Ok(Validator::compile(schema)?.validate(candidate))
}

/// A validator reconstructed from a function schema's `parameters`.
#[derive(Debug, Clone)]
pub struct Validator {
    root: Rule,
    options: ValidatorOptions,
}

impl Validator {
    pub fn compile(schema: &FunctionSchema) -> Result<Self> {
        Self::compile_with(schema, ValidatorOptions::default())
    }

    pub fn compile_with(schema: &FunctionSchema, options: ValidatorOptions) -> Result<Self> {
        let root = Rule::compile(&schema.function.parameters.as_node(), &FieldPath::root())?;
        Ok(Self { root, options })
    }

    /// Compile a standalone node, e.g. a record's schema.
    pub fn for_node(node: &SchemaNode, options: ValidatorOptions) -> Result<Self> {
        Ok(Self {
            root: Rule::compile(node, &FieldPath::root())?,
            options,
        })
    }

    pub fn validate(&self, candidate: &Value) -> ValidationOutcome {
        let mut violations = Vec::new();
        let normalized = self
            .root
            .check(candidate, &FieldPath::root(), &self.options, &mut violations);

        if violations.is_empty() {
            ValidationOutcome::Valid(normalized)
        } else {
            tracing::debug!(count = violations.len(), "candidate failed validation");
            ValidationOutcome::Invalid(ValidationError { violations })
        }
    }
}

#[derive(Debug, Clone)]
struct Rule {
    shape: Shape,
    nullable: bool,
    enumeration: Option<Vec<String>>,
    minimum: Option<Number>,
    maximum: Option<Number>,
    exclusive_minimum: Option<Number>,
    exclusive_maximum: Option<Number>,
    min_length: Option<u64>,
    max_length: Option<u64>,
    pattern: Option<Regex>,
}

#[derive(Debug, Clone)]
enum Shape {
    Boolean,
    String,
    Integer,
    Number,
    Array(Box<Rule>),
    Object {
        properties: IndexMap<String, Rule>,
        required: Vec<String>,
    },
    OneOf(Vec<Rule>),
}

impl Rule {
    fn compile(node: &SchemaNode, path: &FieldPath) -> Result<Self> {
        let malformed = |reason: &str| SchemaError::MalformedSchema {
            path: path.to_string(),
            reason: reason.to_owned(),
        };

        let shape = match (node.kind, &node.one_of) {
            (Some(_), Some(_)) => return Err(malformed("node has both `type` and `oneOf`")),
            (None, None) => return Err(malformed("node has neither `type` nor `oneOf`")),
            (None, Some(variants)) => Shape::OneOf(
                variants
                    .iter()
                    .map(|variant| Rule::compile(variant, path))
                    .collect::<Result<_>>()?,
            ),
            (Some(SchemaType::Boolean), None) => Shape::Boolean,
            (Some(SchemaType::String), None) => Shape::String,
            (Some(SchemaType::Integer), None) => Shape::Integer,
            (Some(SchemaType::Number), None) => Shape::Number,
            (Some(SchemaType::Array), None) => {
                let items = node
                    .items
                    .as_deref()
                    .ok_or_else(|| malformed("array node without `items`"))?;
                Shape::Array(Box::new(Rule::compile(items, &path.index(0))?))
            }
            (Some(SchemaType::Object), None) => {
                let mut properties = IndexMap::new();
                for (name, child) in node.properties.iter().flatten() {
                    properties.insert(name.clone(), Rule::compile(child, &path.key(name))?);
                }
                Shape::Object {
                    properties,
                    required: node.required.clone().unwrap_or_default(),
                }
            }
        };

        let pattern = node
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| malformed(&format!("invalid pattern: {e}")))?;

        Ok(Self {
            shape,
            nullable: node.is_nullable(),
            enumeration: node.enumeration.clone(),
            minimum: node.minimum.clone(),
            maximum: node.maximum.clone(),
            exclusive_minimum: node.exclusive_minimum.clone(),
            exclusive_maximum: node.exclusive_maximum.clone(),
            min_length: node.min_length,
            max_length: node.max_length,
            pattern,
        })
    }

    /// Validate `value`, pushing violations, and return its normalised form.
    fn check(
        &self,
        value: &Value,
        path: &FieldPath,
        options: &ValidatorOptions,
        violations: &mut Vec<Violation>,
    ) -> Value {
        if value.is_null() {
            if !self.nullable {
                violations.push(type_violation(path, &self.expected(), value));
            }
            return Value::Null;
        }

        match &self.shape {
            Shape::Boolean => {
                if !value.is_boolean() {
                    violations.push(type_violation(path, "boolean", value));
                }
                value.clone()
            }
            Shape::String => {
                match value.as_str() {
                    Some(s) => self.check_string(s, path, violations),
                    None => violations.push(type_violation(path, "string", value)),
                }
                value.clone()
            }
            Shape::Integer => match as_integer(value, options) {
                Some(integer) => {
                    self.check_bounds(&integer, path, violations);
                    integer
                }
                None => {
                    violations.push(type_violation(path, "integer", value));
                    value.clone()
                }
            },
            Shape::Number => {
                if value.is_number() {
                    self.check_bounds(value, path, violations);
                } else {
                    violations.push(type_violation(path, "number", value));
                }
                value.clone()
            }
            Shape::Array(items) => match value.as_array() {
                Some(elements) => Value::Array(
                    elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| items.check(element, &path.index(i), options, violations))
                        .collect(),
                ),
                None => {
                    violations.push(type_violation(path, "array", value));
                    value.clone()
                }
            },
            Shape::Object {
                properties,
                required,
            } => match value.as_object() {
                Some(object) => check_object(object, properties, required, path, options, violations),
                None => {
                    violations.push(type_violation(path, "object", value));
                    value.clone()
                }
            },
            Shape::OneOf(variants) => {
                for variant in variants {
                    let mut scratch = Vec::new();
                    let normalized = variant.check(value, path, options, &mut scratch);
                    if scratch.is_empty() {
                        return normalized;
                    }
                }
                violations.push(Violation {
                    path: path.clone(),
                    message: format!("value does not match any of the {} allowed variants", variants.len()),
                    kind: ViolationKind::NoMatch,
                });
                value.clone()
            }
        }
    }

    fn check_string(&self, s: &str, path: &FieldPath, violations: &mut Vec<Violation>) {
        if let Some(allowed) = &self.enumeration {
            if !allowed.iter().any(|a| a == s) {
                violations.push(Violation {
                    path: path.clone(),
                    message: format!("`{s}` is not one of {allowed:?}"),
                    kind: ViolationKind::Enum,
                });
            }
        }

        let length = s.chars().count() as u64;
        if let Some(min) = self.min_length.filter(|min| length < *min) {
            violations.push(Violation {
                path: path.clone(),
                message: format!("must be at least {min} characters long, got {length}"),
                kind: ViolationKind::Length,
            });
        }
        if let Some(max) = self.max_length.filter(|max| length > *max) {
            violations.push(Violation {
                path: path.clone(),
                message: format!("must be at most {max} characters long, got {length}"),
                kind: ViolationKind::Length,
            });
        }
        if let Some(pattern) = self.pattern.as_ref().filter(|p| !p.is_match(s)) {
            violations.push(Violation {
                path: path.clone(),
                message: format!("`{s}` does not match pattern `{}`", pattern.as_str()),
                kind: ViolationKind::Pattern,
            });
        }
    }

    fn check_bounds(&self, value: &Value, path: &FieldPath, violations: &mut Vec<Violation>) {
        let Value::Number(n) = value else {
            return;
        };
        let checks: [(&Option<Number>, &str, fn(Ordering) -> bool); 4] = [
            (&self.minimum, ">=", Ordering::is_ge),
            (&self.exclusive_minimum, ">", Ordering::is_gt),
            (&self.maximum, "<=", Ordering::is_le),
            (&self.exclusive_maximum, "<", Ordering::is_lt),
        ];
        for (bound, op, holds) in checks {
            let Some(bound) = bound else {
                continue;
            };
            if !compare_numbers(n, bound).is_some_and(holds) {
                violations.push(Violation {
                    path: path.clone(),
                    message: format!("must be {op} {bound}, got {value}"),
                    kind: ViolationKind::Range,
                });
            }
        }
    }

    fn expected(&self) -> String {
        match &self.shape {
            Shape::Boolean => "boolean".into(),
            Shape::String => "string".into(),
            Shape::Integer => "integer".into(),
            Shape::Number => "number".into(),
            Shape::Array(_) => "array".into(),
            Shape::Object { .. } => "object".into(),
            Shape::OneOf(variants) => variants
                .iter()
                .map(Rule::expected)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

fn check_object(
    object: &Map<String, Value>,
    properties: &IndexMap<String, Rule>,
    required: &[String],
    path: &FieldPath,
    options: &ValidatorOptions,
    violations: &mut Vec<Violation>,
) -> Value {
    let mut normalized_fields = IndexMap::with_capacity(properties.len());

    for (name, rule) in properties {
        match object.get(name) {
            Some(value) => {
                let normalized = rule.check(value, &path.key(name), options, violations);
                normalized_fields.insert(name.as_str(), normalized);
            }
            None if required.contains(name) => violations.push(missing(path, name)),
            None => {}
        }
    }
    for name in required {
        if !properties.contains_key(name) && !object.contains_key(name) {
            violations.push(missing(path, name));
        }
    }

    let normalized = object
        .iter()
        .map(|(key, value)| {
            let value = normalized_fields
                .swap_remove(key.as_str())
                .unwrap_or_else(|| value.clone());
            (key.clone(), value)
        })
        .collect();
    Value::Object(normalized)
}

fn as_integer(value: &Value, options: &ValidatorOptions) -> Option<Value> {
    let Value::Number(n) = value else {
        return None;
    };
    if n.is_i64() || n.is_u64() {
        return Some(value.clone());
    }
    let f = n.as_f64()?;
    let integral = f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64;
    (options.coerce_integral_floats && integral).then(|| Value::from(f as i64))
}

/// Exact for two integers of the same sign class, `f64` otherwise.
fn compare_numbers(value: &Number, bound: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (value.as_i64(), bound.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (value.as_u64(), bound.as_u64()) {
        return Some(a.cmp(&b));
    }
    value.as_f64()?.partial_cmp(&bound.as_f64()?)
}

fn missing(path: &FieldPath, name: &str) -> Violation {
    Violation {
        path: path.key(name),
        message: "field required".to_owned(),
        kind: ViolationKind::Missing,
    }
}

fn type_violation(path: &FieldPath, expected: &str, value: &Value) -> Violation {
    Violation {
        path: path.clone(),
        message: format!("expected {expected}, got {}", json_type_name(value)),
        kind: ViolationKind::Type,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
