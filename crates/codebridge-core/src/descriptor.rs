//! Abstract descriptions of parameter and field types.
//!
//! A [`TypeDescriptor`] is what the schema builder walks.  It is independent
//! of any concrete value and of how it was obtained: write one by hand, or
//! reflect it from a `schemars::JsonSchema` type through
//! [`crate::reflect::descriptor_for`].
//!
//! ```rust
//! use codebridge_core::descriptor::{Constraints, FieldMeta, Primitive, TypeDescriptor};
//!
//! // An integer between 1 and 10, inclusive.
//! let rank = TypeDescriptor::integer().annotated(
//!     FieldMeta::described("Rank on a scale of 1 to 10")
//!         .with_constraints(Constraints::default().ge(1).le(10)),
//! );
//!
//! assert!(matches!(rank.bare(), TypeDescriptor::Primitive(Primitive::Integer)));
//! ```

use std::fmt;

use serde_json::Value;

/// Scalar kinds with a direct JSON Schema counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    String,
    Integer,
    Number,
}

/// Closed set of shapes the builder knows how to translate.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    /// A named enumeration, rendered by its members' underlying values.
    Enum(EnumType),
    /// A closed set of exact values.  Schema-equivalent to [`Self::Enum`].
    Literal(Vec<String>),
    Optional(Box<TypeDescriptor>),
    Union(Vec<TypeDescriptor>),
    List(Box<TypeDescriptor>),
    Record(Record),
    /// A descriptor carrying field metadata (description, bounds).
    Annotated(Box<TypeDescriptor>, FieldMeta),
    /// The unit / `null` type.  Only meaningful as a union arm.
    Null,
    /// A host shape with no schema mapping, e.g. a tuple or a set.
    Opaque(String),
}

impl TypeDescriptor {
    pub fn boolean() -> Self {
        TypeDescriptor::Primitive(Primitive::Boolean)
    }

    pub fn string() -> Self {
        TypeDescriptor::Primitive(Primitive::String)
    }

    pub fn integer() -> Self {
        TypeDescriptor::Primitive(Primitive::Integer)
    }

    pub fn number() -> Self {
        TypeDescriptor::Primitive(Primitive::Number)
    }

    pub fn literal<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDescriptor::Literal(values.into_iter().map(Into::into).collect())
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(inner))
    }

    pub fn union(variants: impl IntoIterator<Item = TypeDescriptor>) -> Self {
        TypeDescriptor::Union(variants.into_iter().collect())
    }

    pub fn list(element: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(element))
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        TypeDescriptor::Opaque(name.into())
    }

    /// Wrap `self` with field metadata.
    pub fn annotated(self, meta: FieldMeta) -> Self {
        TypeDescriptor::Annotated(Box::new(self), meta)
    }

    /// Shortcut for annotating with a description only.
    pub fn described(self, description: impl Into<String>) -> Self {
        self.annotated(FieldMeta::described(description))
    }

    /// The descriptor with every [`Self::Annotated`] layer stripped.
    pub fn bare(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Annotated(inner, _) => inner.bare(),
            other => other,
        }
    }

    /// Description attached by the outermost annotation that has one,
    /// looking through `Optional` wrappers.
    pub fn description(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Annotated(inner, meta) => {
                meta.description.as_deref().or_else(|| inner.description())
            }
            TypeDescriptor::Optional(inner) => inner.description(),
            _ => None,
        }
    }

    /// Short human readable name of the shape, used in logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeDescriptor::Primitive(Primitive::Boolean) => "boolean",
            TypeDescriptor::Primitive(Primitive::String) => "string",
            TypeDescriptor::Primitive(Primitive::Integer) => "integer",
            TypeDescriptor::Primitive(Primitive::Number) => "number",
            TypeDescriptor::Enum(_) => "enum",
            TypeDescriptor::Literal(_) => "literal",
            TypeDescriptor::Optional(_) => "optional",
            TypeDescriptor::Union(_) => "union",
            TypeDescriptor::List(_) => "list",
            TypeDescriptor::Record(_) => "record",
            TypeDescriptor::Annotated(_, _) => "annotated",
            TypeDescriptor::Null => "null",
            TypeDescriptor::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Enum(e) => write!(f, "enum {}", e.name.as_deref().unwrap_or("<anonymous>")),
            TypeDescriptor::Literal(values) => write!(f, "literal {values:?}"),
            TypeDescriptor::Optional(inner) => write!(f, "optional<{inner}>"),
            TypeDescriptor::Union(variants) => {
                write!(f, "union<")?;
                for (i, v) in variants.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ">")
            }
            TypeDescriptor::List(inner) => write!(f, "list<{inner}>"),
            TypeDescriptor::Record(r) => write!(f, "record {}", r.name),
            TypeDescriptor::Annotated(inner, _) => write!(f, "{inner}"),
            TypeDescriptor::Opaque(name) => f.write_str(name),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// A named enumeration.  `values` are the members' underlying values, never
/// their symbolic names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: Option<String>,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<EnumType> for TypeDescriptor {
    fn from(value: EnumType) -> Self {
        TypeDescriptor::Enum(value)
    }
}

/// A structured record with fields in declaration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

impl From<Record> for TypeDescriptor {
    fn from(value: Record) -> Self {
        TypeDescriptor::Record(value)
    }
}

/// One field of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
    pub required: bool,
    pub default: Option<Value>,
}

impl Field {
    /// A required field without description.
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            description: None,
            required: true,
            default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the field as optional, without a default value.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Give the field a default value; this also makes it optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.required = false;
        self.default = Some(default);
        self
    }
}

/// Metadata attachable to any descriptor through
/// [`TypeDescriptor::Annotated`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldMeta {
    pub description: Option<String>,
    pub constraints: Constraints,
}

impl FieldMeta {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            constraints: Constraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.constraints.is_empty()
    }
}

/// Numeric and string constraints.  All of them are independent and may
/// coexist, e.g. `ge` together with `le` for a closed range.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Constraints {
    pub exclusive_minimum: Option<Bound>,
    pub minimum: Option<Bound>,
    pub exclusive_maximum: Option<Bound>,
    pub maximum: Option<Bound>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

impl Constraints {
    /// Strictly greater than `bound` (`exclusiveMinimum`).
    pub fn gt(mut self, bound: impl Into<Bound>) -> Self {
        self.exclusive_minimum = Some(bound.into());
        self
    }

    /// Greater than or equal to `bound` (`minimum`).
    pub fn ge(mut self, bound: impl Into<Bound>) -> Self {
        self.minimum = Some(bound.into());
        self
    }

    /// Strictly less than `bound` (`exclusiveMaximum`).
    pub fn lt(mut self, bound: impl Into<Bound>) -> Self {
        self.exclusive_maximum = Some(bound.into());
        self
    }

    /// Less than or equal to `bound` (`maximum`).
    pub fn le(mut self, bound: impl Into<Bound>) -> Self {
        self.maximum = Some(bound.into());
        self
    }

    pub fn min_length(mut self, length: u64) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn max_length(mut self, length: u64) -> Self {
        self.max_length = Some(length);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn has_numeric(&self) -> bool {
        self.exclusive_minimum.is_some()
            || self.minimum.is_some()
            || self.exclusive_maximum.is_some()
            || self.maximum.is_some()
    }

    pub fn has_string(&self) -> bool {
        self.min_length.is_some() || self.max_length.is_some() || self.pattern.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_numeric() && !self.has_string()
    }
}

/// A numeric bound.  Integral bounds stay integers in the emitted schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Int(i64),
    Float(f64),
}

impl Bound {
    /// Float bounds without a fractional part collapse into integers, so
    /// `1.0` renders as `1`.
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Bound::Int(value as i64)
        } else {
            Bound::Float(value)
        }
    }
}

macro_rules! impl_bound_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Bound {
                fn from(value: $t) -> Self {
                    Bound::Int(value as i64)
                }
            }
        )*
    };
}

impl_bound_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Bound {
    fn from(value: f32) -> Self {
        Bound::Float(value as f64)
    }
}

impl From<f64> for Bound {
    fn from(value: f64) -> Self {
        Bound::Float(value)
    }
}

/// One parameter of a callable, as handed over by signature extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeDescriptor,
    /// `None` means "no default": the parameter is required.
    pub default: Option<Value>,
}

impl Param {
    pub fn required(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, ty: TypeDescriptor, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Metadata about the callable a function schema describes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallableMeta {
    pub name: String,
    pub doc: Option<String>,
    pub is_async: bool,
    /// Drop the leading receiver parameter before assembling the schema.
    pub is_bound_method: bool,
    /// Declared return type, if any.  Only used to warn when it is missing.
    pub returns: Option<TypeDescriptor>,
}

impl CallableMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn with_bound_method(mut self, is_bound_method: bool) -> Self {
        self.is_bound_method = is_bound_method;
        self
    }

    pub fn with_returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = Some(returns);
        self
    }
}
