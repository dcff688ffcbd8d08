//! Recursive translation of [`TypeDescriptor`]s into [`SchemaNode`]s, and
//! assembly of nodes into parameter and function schemas.
//!
//! ```rust
//! use codebridge_core::builder::build_function_schema;
//! use codebridge_core::descriptor::{CallableMeta, Param, TypeDescriptor};
//!
//! let schema = build_function_schema(
//!     &CallableMeta::new("add_numbers").with_doc("Adds two integers and returns the sum."),
//!     &[
//!         Param::required("a", TypeDescriptor::integer().described("The first number")),
//!         Param::required("b", TypeDescriptor::integer().described("The second number")),
//!     ],
//! )?;
//!
//! assert_eq!(schema.function.parameters.required, ["a", "b"]);
//! # Ok::<(), codebridge_core::error::SchemaError>(())
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Number;

use crate::{
    descriptor::{Bound, CallableMeta, FieldMeta, Param, Primitive, Record, TypeDescriptor},
    error::{Result, SchemaError},
    schema::{FunctionSchema, FunctionSpec, ParameterSchema, SchemaNode, SchemaType},
};

/// Build the node for a parameter or field called `field_name`.
///
/// The node's `description` is the one attached to the descriptor, or
/// `field_name` when there is none.
pub fn build_schema(descriptor: &TypeDescriptor, field_name: &str) -> Result<SchemaNode> {
    let mut node = build_node(descriptor)?;
    node.description = Some(
        descriptor
            .description()
            .unwrap_or(field_name)
            .to_owned(),
    );
    Ok(node)
}

/// Build the `parameters` object for a parameter list in declaration order.
///
/// With `is_bound_method` the leading receiver parameter is skipped.
pub fn build_parameters(params: &[Param], is_bound_method: bool) -> Result<ParameterSchema> {
    let params = if is_bound_method {
        &params[params.len().min(1)..]
    } else {
        params
    };

    let mut properties = IndexMap::with_capacity(params.len());
    let mut required = Vec::new();

    for param in params {
        let mut node = build_schema(&param.ty, &param.name)?;
        match &param.default {
            Some(default) => node.default = Some(default.clone()),
            None => required.push(param.name.clone()),
        }
        properties.insert(param.name.clone(), node);
    }

    Ok(ParameterSchema {
        kind: SchemaType::Object,
        properties,
        required,
    })
}

/// Build the complete `{"type": "function", ...}` schema for a callable.
pub fn build_function_schema(meta: &CallableMeta, params: &[Param]) -> Result<FunctionSchema> {
    if meta.returns.is_none() {
        tracing::warn!(
            function = %meta.name,
            "return type is not declared; tools should return a string or a structured record"
        );
    }

    let parameters = build_parameters(params, meta.is_bound_method)?;

    Ok(FunctionSchema::new(FunctionSpec {
        name: meta.name.clone(),
        description: meta.doc.clone().unwrap_or_default(),
        parameters,
        is_async: meta.is_async,
    }))
}

fn build_node(descriptor: &TypeDescriptor) -> Result<SchemaNode> {
    tracing::debug!(kind = descriptor.kind_name(), "building schema node");

    match descriptor {
        TypeDescriptor::Annotated(inner, meta) => {
            let mut node = build_node(inner)?;
            apply_meta(&mut node, meta)?;
            Ok(node)
        }
        TypeDescriptor::Primitive(primitive) => Ok(SchemaNode::typed(match primitive {
            Primitive::Boolean => SchemaType::Boolean,
            Primitive::String => SchemaType::String,
            Primitive::Integer => SchemaType::Integer,
            Primitive::Number => SchemaType::Number,
        })),
        TypeDescriptor::Literal(values) => string_enum(values, descriptor),
        TypeDescriptor::Enum(enumeration) => string_enum(&enumeration.values, descriptor),
        TypeDescriptor::Record(record) => build_record(record),
        TypeDescriptor::List(element) => Ok(SchemaNode {
            kind: Some(SchemaType::Array),
            items: Some(Box::new(build_node(element)?)),
            ..Default::default()
        }),
        TypeDescriptor::Optional(inner) => build_nullable(inner),
        TypeDescriptor::Union(variants) => build_union(variants),
        TypeDescriptor::Null => Err(SchemaError::unsupported("null outside of an optional")),
        TypeDescriptor::Opaque(name) => Err(SchemaError::unsupported(name.as_str())),
    }
}

fn string_enum(values: &[String], descriptor: &TypeDescriptor) -> Result<SchemaNode> {
    if values.is_empty() {
        return Err(SchemaError::unsupported(format!("{descriptor} without values")));
    }
    Ok(SchemaNode {
        kind: Some(SchemaType::String),
        enumeration: Some(values.to_vec()),
        ..Default::default()
    })
}

fn build_record(record: &Record) -> Result<SchemaNode> {
    let mut properties = IndexMap::with_capacity(record.fields.len());
    let mut required = Vec::new();

    for field in &record.fields {
        let mut node = build_node(&field.ty)?;
        node.description = Some(
            field
                .description
                .as_deref()
                .or_else(|| field.ty.description())
                .unwrap_or(&field.name)
                .to_owned(),
        );
        if let Some(default) = &field.default {
            node.default = Some(default.clone());
        }
        if field.required {
            required.push(field.name.clone());
        }
        properties.insert(field.name.clone(), node);
    }

    let description = record
        .description
        .clone()
        .or_else(|| record.title.clone())
        .unwrap_or_default();

    Ok(SchemaNode {
        kind: Some(SchemaType::Object),
        description: Some(description),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        ..Default::default()
    })
}

fn build_nullable(inner: &TypeDescriptor) -> Result<SchemaNode> {
    let mut node = build_node(inner)?;
    if node.kind.is_none() {
        return Err(SchemaError::unsupported(format!("nullable {inner}")));
    }
    node.nullable = Some(true);
    Ok(node)
}

fn build_union(variants: &[TypeDescriptor]) -> Result<SchemaNode> {
    let mut arms = Vec::with_capacity(variants.len());
    let mut has_null = false;
    flatten_union(variants, &mut arms, &mut has_null);

    match (arms.as_slice(), has_null) {
        ([], _) => Err(SchemaError::unsupported("union without non-null variants")),
        ([single], true) => build_nullable(single),
        ([single], false) => build_node(single),
        (_, true) => Err(SchemaError::unsupported(format!(
            "nullable {}",
            TypeDescriptor::Union(variants.to_vec())
        ))),
        (arms, false) => Ok(SchemaNode {
            one_of: Some(arms.iter().map(|arm| build_node(arm)).collect::<Result<_>>()?),
            ..Default::default()
        }),
    }
}

fn flatten_union<'a>(
    variants: &'a [TypeDescriptor],
    arms: &mut Vec<&'a TypeDescriptor>,
    has_null: &mut bool,
) {
    // Annotations on nested unions and optionals are dropped with the wrapper.
    for variant in variants {
        match variant.bare() {
            TypeDescriptor::Union(nested) => flatten_union(nested, arms, has_null),
            TypeDescriptor::Optional(inner) => {
                *has_null = true;
                flatten_union(std::slice::from_ref(inner.as_ref()), arms, has_null);
            }
            TypeDescriptor::Null => *has_null = true,
            _ => arms.push(variant),
        }
    }
}

fn apply_meta(node: &mut SchemaNode, meta: &FieldMeta) -> Result<()> {
    if let Some(description) = &meta.description {
        node.description = Some(description.clone());
    }

    let constraints = &meta.constraints;
    let kind = node
        .kind
        .map(|kind| kind.to_string())
        .unwrap_or_else(|| "union".to_owned());

    if constraints.has_numeric() {
        if !matches!(node.kind, Some(SchemaType::Integer | SchemaType::Number)) {
            return Err(SchemaError::constraint(
                "bound",
                format!("numeric bounds need an integer or number, found {kind}"),
            ));
        }
        merge_bound(&mut node.exclusive_minimum, constraints.exclusive_minimum, "exclusiveMinimum")?;
        merge_bound(&mut node.minimum, constraints.minimum, "minimum")?;
        merge_bound(&mut node.exclusive_maximum, constraints.exclusive_maximum, "exclusiveMaximum")?;
        merge_bound(&mut node.maximum, constraints.maximum, "maximum")?;
    }

    if constraints.has_string() {
        if node.kind != Some(SchemaType::String) {
            return Err(SchemaError::constraint(
                "length",
                format!("length and pattern need a string, found {kind}"),
            ));
        }
        if let Some(pattern) = &constraints.pattern {
            Regex::new(pattern).map_err(|e| SchemaError::constraint("pattern", e.to_string()))?;
            node.pattern = Some(pattern.clone());
        }
        if constraints.min_length.is_some() {
            node.min_length = constraints.min_length;
        }
        if constraints.max_length.is_some() {
            node.max_length = constraints.max_length;
        }
    }

    Ok(())
}

fn merge_bound(slot: &mut Option<Number>, bound: Option<Bound>, name: &'static str) -> Result<()> {
    let Some(bound) = bound else {
        return Ok(());
    };
    let number = match bound {
        Bound::Int(v) => Number::from(v),
        Bound::Float(v) => Number::from_f64(v)
            .ok_or_else(|| SchemaError::constraint(name, format!("bound must be finite, got {v}")))?,
    };
    *slot = Some(number);
    Ok(())
}
