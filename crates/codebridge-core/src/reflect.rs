//! Reflect Rust types into [`TypeDescriptor`]s through [`schemars`].
//!
//! Any type deriving [`JsonSchema`] can describe itself as a JSON Schema;
//! this module turns that schema back into the closed descriptor set the
//! builder understands.  Doc comments become descriptions and
//! `#[schemars(range(..), length(..), regex(..))]` attributes become
//! [`Constraints`].
//!
//! Shapes without a schema mapping (tuples, sets, maps, untyped values,
//! recursive references) are reflected as [`TypeDescriptor::Opaque`], so the
//! builder rejects them loudly instead of guessing.
//!
//! # Example
//!
//! ```
//! use codebridge_core::reflect::params_for;
//! use schemars::JsonSchema;
//!
//! #[derive(JsonSchema)]
//! struct Search {
//!     /// Free-text query
//!     query: String,
//!     limit: Option<u32>,
//! }
//!
//! let params = params_for::<Search>()?;
//! assert!(params[0].is_required());
//! assert_eq!(params[1].default, Some(serde_json::Value::Null));
//! # Ok::<(), codebridge_core::error::SchemaError>(())
//! ```

use schemars::{
    r#gen::SchemaSettings,
    schema::{InstanceType, ObjectValidation, RootSchema, Schema, SchemaObject, SingleOrVec},
    JsonSchema, SchemaGenerator,
};
use serde_json::Value;

use crate::{
    descriptor::{Bound, Constraints, EnumType, Field, FieldMeta, Param, Record, TypeDescriptor},
    error::{Result, SchemaError},
};

/// Generate the draft-07 schema of `T` with subschemas inlined.
///
/// Recursive types still produce `$ref`s into the root's definitions.
pub fn root_schema_for<T>() -> RootSchema
where
    T: JsonSchema,
{
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;

    let generator = SchemaGenerator::new(settings);
    generator.into_root_schema_for::<T>()
}

/// Reflect `T` into a [`TypeDescriptor`].
pub fn descriptor_for<T>() -> TypeDescriptor
where
    T: JsonSchema,
{
    let root = root_schema_for::<T>();
    Reflector::new(&root.definitions).convert_object(&root.schema)
}

/// Flatten the record `T` into the parameter list of a callable taking its
/// fields as arguments.
///
/// Fields that are not required keep their declared default, or default to
/// `null` when none is declared.
pub fn params_for<T>() -> Result<Vec<Param>>
where
    T: JsonSchema,
{
    let descriptor = descriptor_for::<T>();
    let TypeDescriptor::Record(record) = descriptor.bare() else {
        return Err(SchemaError::unsupported(format!(
            "{} is not a record but {descriptor}",
            T::schema_name()
        )));
    };

    Ok(record
        .fields
        .iter()
        .map(|field| {
            if field.required {
                Param::required(field.name.clone(), field.ty.clone())
            } else {
                let default = field.default.clone().unwrap_or(Value::Null);
                Param::with_default(field.name.clone(), field.ty.clone(), default)
            }
        })
        .collect())
}

struct Reflector<'a> {
    definitions: &'a schemars::Map<String, Schema>,
    resolving: Vec<String>,
}

impl<'a> Reflector<'a> {
    fn new(definitions: &'a schemars::Map<String, Schema>) -> Self {
        Self {
            definitions,
            resolving: Vec::new(),
        }
    }

    fn convert(&mut self, schema: &Schema) -> TypeDescriptor {
        match schema {
            Schema::Bool(_) => TypeDescriptor::opaque("any value"),
            Schema::Object(object) => self.convert_object(object),
        }
    }

    fn convert_object(&mut self, object: &SchemaObject) -> TypeDescriptor {
        let shape = self.shape(object);

        let meta = FieldMeta {
            description: object.metadata.as_ref().and_then(|m| m.description.clone()),
            constraints: constraints(object),
        };
        if meta.is_empty() {
            shape
        } else {
            shape.annotated(meta)
        }
    }

    fn shape(&mut self, object: &SchemaObject) -> TypeDescriptor {
        if let Some(reference) = &object.reference {
            return self.resolve(reference);
        }
        if let Some(value) = &object.const_value {
            return TypeDescriptor::Literal(vec![literal_text(value)]);
        }
        if let Some(values) = &object.enum_values {
            return enumeration(object, values);
        }
        if let Some(union) = self.subschemas(object) {
            return union;
        }

        match &object.instance_type {
            None => TypeDescriptor::opaque("untyped value"),
            Some(SingleOrVec::Single(kind)) => self.instance(object, **kind),
            Some(SingleOrVec::Vec(kinds)) => {
                let mut arms: Vec<_> = kinds
                    .iter()
                    .filter(|kind| **kind != InstanceType::Null)
                    .map(|kind| self.instance(object, *kind))
                    .collect();
                let base = match arms.len() {
                    0 => return TypeDescriptor::Null,
                    1 => arms.remove(0),
                    _ => TypeDescriptor::Union(arms),
                };
                if kinds.contains(&InstanceType::Null) {
                    TypeDescriptor::optional(base)
                } else {
                    base
                }
            }
        }
    }

    fn instance(&mut self, object: &SchemaObject, kind: InstanceType) -> TypeDescriptor {
        match kind {
            InstanceType::Null => TypeDescriptor::Null,
            InstanceType::Boolean => TypeDescriptor::boolean(),
            InstanceType::String => TypeDescriptor::string(),
            InstanceType::Integer => TypeDescriptor::integer(),
            InstanceType::Number => TypeDescriptor::number(),
            InstanceType::Array => {
                let Some(array) = &object.array else {
                    return TypeDescriptor::opaque("untyped array");
                };
                if array.unique_items == Some(true) {
                    return TypeDescriptor::opaque("set");
                }
                match &array.items {
                    Some(SingleOrVec::Single(item)) => TypeDescriptor::list(self.convert(item)),
                    Some(SingleOrVec::Vec(_)) => TypeDescriptor::opaque("tuple"),
                    None => TypeDescriptor::opaque("untyped array"),
                }
            }
            InstanceType::Object => match object.object.as_deref() {
                Some(validation) if !is_map(validation) => self.record(object, validation),
                _ => TypeDescriptor::opaque("map"),
            },
        }
    }

    fn record(&mut self, object: &SchemaObject, validation: &ObjectValidation) -> TypeDescriptor {
        let metadata = object.metadata.as_deref();
        let title = metadata.and_then(|m| m.title.clone());

        let mut record = Record::new(title.clone().unwrap_or_else(|| "object".to_owned()));
        record.title = title;
        record.description = metadata.and_then(|m| m.description.clone());

        for (name, schema) in &validation.properties {
            let mut field = Field::new(name.clone(), self.convert(schema));
            if !validation.required.contains(name) {
                field = match declared_default(schema) {
                    Some(default) => field.with_default(default),
                    None => field.optional(),
                };
            }
            record.fields.push(field);
        }

        record.into()
    }

    /// `allOf` with a single entry, `anyOf` and `oneOf`.
    fn subschemas(&mut self, object: &SchemaObject) -> Option<TypeDescriptor> {
        let subschemas = object.subschemas.as_deref()?;

        if let Some(all_of) = &subschemas.all_of {
            return Some(match all_of.as_slice() {
                [single] => self.convert(single),
                _ => TypeDescriptor::opaque("intersection"),
            });
        }

        let variants = subschemas.one_of.as_ref().or(subschemas.any_of.as_ref())?;

        let tags: Option<Vec<String>> = variants
            .iter()
            .map(|v| single_string(v).map(str::to_owned))
            .collect();
        if let Some(values) = tags.filter(|values| !values.is_empty()) {
            return Some(TypeDescriptor::Enum(EnumType {
                name: object.metadata.as_ref().and_then(|m| m.title.clone()),
                values,
            }));
        }

        let mut has_null = false;
        let mut arms = Vec::with_capacity(variants.len());
        for variant in variants {
            match self.convert(variant) {
                TypeDescriptor::Null => has_null = true,
                arm => arms.push(arm),
            }
        }

        Some(match (arms.len(), has_null) {
            (1, true) => TypeDescriptor::optional(arms.remove(0)),
            (_, true) => {
                arms.push(TypeDescriptor::Null);
                TypeDescriptor::Union(arms)
            }
            (_, false) => TypeDescriptor::Union(arms),
        })
    }

    fn resolve(&mut self, reference: &str) -> TypeDescriptor {
        let name = reference.strip_prefix("#/definitions/").unwrap_or(reference);
        if self.resolving.iter().any(|pending| pending == name) {
            return TypeDescriptor::opaque(format!("recursive reference to {name}"));
        }

        let definitions = self.definitions;
        let Some(schema) = definitions.get(name) else {
            tracing::debug!(reference, "unresolvable schema reference");
            return TypeDescriptor::opaque(format!("unresolved reference {reference}"));
        };

        self.resolving.push(name.to_owned());
        let descriptor = self.convert(schema);
        self.resolving.pop();
        descriptor
    }
}

fn enumeration(object: &SchemaObject, values: &[Value]) -> TypeDescriptor {
    let nullable = values.iter().any(Value::is_null)
        || matches!(&object.instance_type, Some(SingleOrVec::Vec(kinds)) if kinds.contains(&InstanceType::Null));

    let enumeration = TypeDescriptor::Enum(EnumType {
        name: object.metadata.as_ref().and_then(|m| m.title.clone()),
        values: values
            .iter()
            .filter(|value| !value.is_null())
            .map(literal_text)
            .collect(),
    });

    if nullable {
        TypeDescriptor::optional(enumeration)
    } else {
        enumeration
    }
}

fn constraints(object: &SchemaObject) -> Constraints {
    let mut constraints = Constraints::default();

    if let Some(number) = object.number.as_deref() {
        constraints.minimum = number.minimum.map(Bound::from_f64);
        constraints.maximum = number.maximum.map(Bound::from_f64);
        constraints.exclusive_minimum = number.exclusive_minimum.map(Bound::from_f64);
        constraints.exclusive_maximum = number.exclusive_maximum.map(Bound::from_f64);
    }
    if let Some(string) = object.string.as_deref() {
        constraints.min_length = string.min_length.map(u64::from);
        constraints.max_length = string.max_length.map(u64::from);
        constraints.pattern = string.pattern.clone();
    }

    constraints
}

fn is_map(validation: &ObjectValidation) -> bool {
    validation.properties.is_empty()
        && !matches!(validation.additional_properties.as_deref(), None | Some(Schema::Bool(false)))
}

fn declared_default(schema: &Schema) -> Option<Value> {
    match schema {
        Schema::Object(object) => object.metadata.as_ref()?.default.clone(),
        Schema::Bool(_) => None,
    }
}

fn single_string(schema: &Schema) -> Option<&str> {
    let Schema::Object(object) = schema else {
        return None;
    };
    if let Some(Value::String(value)) = &object.const_value {
        return Some(value);
    }
    match object.enum_values.as_deref() {
        Some([Value::String(value)]) => Some(value),
        _ => None,
    }
}

/// Enum values are always rendered as strings.
fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::builder::{build_function_schema, build_schema};
    use crate::descriptor::{CallableMeta, Primitive};

    #[derive(JsonSchema, Deserialize)]
    #[serde(rename_all = "lowercase")]
    #[allow(dead_code)]
    enum Unit {
        Celsius,
        Fahrenheit,
    }

    #[derive(JsonSchema, Deserialize)]
    #[allow(dead_code)]
    enum Mood {
        /// Everything is fine
        Happy,
        /// Nothing is fine
        Grumpy,
    }

    fn default_days() -> u32 {
        3
    }

    /// Forecast request
    #[derive(JsonSchema, Deserialize)]
    #[allow(dead_code)]
    struct Forecast {
        /// The city to look up
        city: String,
        #[schemars(range(min = 1, max = 14))]
        #[serde(default = "default_days")]
        days: u32,
        unit: Option<Unit>,
        #[schemars(regex(pattern = r"^\d{5}$"), length(max = 5))]
        zip: String,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Item {
        name: String,
        #[schemars(range(min = 0))]
        price: f64,
    }

    #[derive(JsonSchema)]
    #[allow(dead_code)]
    struct Order {
        items: Vec<Item>,
        mood: Mood,
    }

    fn field<'a>(record: &'a Record, name: &str) -> &'a Field {
        record.fields.iter().find(|f| f.name == name).unwrap()
    }

    fn record_of(descriptor: &TypeDescriptor) -> &Record {
        match descriptor.bare() {
            TypeDescriptor::Record(record) => record,
            other => panic!("expected a record, got {other}"),
        }
    }

    #[test]
    fn struct_becomes_record_in_declaration_order() {
        let descriptor = descriptor_for::<Forecast>();
        let record = record_of(&descriptor);

        let names: Vec<_> = record.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["city", "days", "unit", "zip"]);
        assert_eq!(record.name, "Forecast");
        assert_eq!(record.description.as_deref(), Some("Forecast request"));
        assert_eq!(
            field(record, "city").ty.description(),
            Some("The city to look up")
        );
    }

    #[test]
    fn bounds_and_string_validations_become_constraints() {
        let descriptor = descriptor_for::<Forecast>();
        let record = record_of(&descriptor);

        let TypeDescriptor::Annotated(_, meta) = &field(record, "days").ty else {
            panic!("days should carry constraints");
        };
        assert_eq!(meta.constraints.minimum, Some(Bound::Int(1)));
        assert_eq!(meta.constraints.maximum, Some(Bound::Int(14)));

        let TypeDescriptor::Annotated(_, meta) = &field(record, "zip").ty else {
            panic!("zip should carry constraints");
        };
        assert_eq!(meta.constraints.pattern.as_deref(), Some(r"^\d{5}$"));
        assert_eq!(meta.constraints.max_length, Some(5));
    }

    #[test]
    fn optional_unit_enum_reflects_as_optional_enum() {
        let descriptor = descriptor_for::<Forecast>();
        let record = record_of(&descriptor);

        let unit = &field(record, "unit").ty;
        let TypeDescriptor::Optional(inner) = unit.bare() else {
            panic!("unit should be optional, got {unit}");
        };
        let TypeDescriptor::Enum(enumeration) = inner.bare() else {
            panic!("unit should wrap an enum, got {inner}");
        };
        assert_eq!(enumeration.values, ["celsius", "fahrenheit"]);
    }

    #[test]
    fn documented_unit_variants_collapse_into_one_enum() {
        let descriptor = descriptor_for::<Mood>();
        let TypeDescriptor::Enum(enumeration) = descriptor.bare() else {
            panic!("expected enum, got {descriptor}");
        };
        assert_eq!(enumeration.values, ["Happy", "Grumpy"]);
    }

    #[test]
    fn params_carry_required_and_defaults() {
        let params = params_for::<Forecast>().unwrap();

        assert!(params[0].is_required());
        assert_eq!(params[1].default, Some(json!(3)));
        assert_eq!(params[2].default, Some(Value::Null));
        assert!(params[3].is_required());

        let schema = build_function_schema(&CallableMeta::new("forecast"), &params).unwrap();
        let value = schema.to_value().unwrap();
        let properties = &value["function"]["parameters"]["properties"];

        assert_eq!(value["function"]["parameters"]["required"], json!(["city", "zip"]));
        assert_eq!(properties["days"]["minimum"], json!(1));
        assert_eq!(properties["days"]["maximum"], json!(14));
        assert_eq!(properties["unit"]["nullable"], json!(true));
        assert_eq!(properties["unit"]["enum"], json!(["celsius", "fahrenheit"]));
        assert_eq!(properties["unit"]["description"], json!("unit"));
    }

    #[test]
    fn nested_records_and_lists_build() {
        let descriptor = descriptor_for::<Order>();
        let node = build_schema(&descriptor, "order").unwrap();
        let value = serde_json::to_value(&node).unwrap();

        let items = &value["properties"]["items"];
        assert_eq!(items["type"], "array");
        assert_eq!(items["items"]["type"], "object");
        assert_eq!(items["items"]["properties"]["price"]["type"], "number");
        assert_eq!(items["items"]["properties"]["price"]["minimum"], json!(0));
        assert_eq!(value["properties"]["mood"]["enum"], json!(["Happy", "Grumpy"]));
        assert_eq!(value["required"], json!(["items", "mood"]));
    }

    #[test]
    fn primitives_reflect_directly() {
        assert_eq!(descriptor_for::<bool>(), TypeDescriptor::boolean());
        assert_eq!(descriptor_for::<String>(), TypeDescriptor::string());
        assert_eq!(descriptor_for::<f64>(), TypeDescriptor::number());
        assert!(matches!(
            descriptor_for::<i64>().bare(),
            TypeDescriptor::Primitive(Primitive::Integer)
        ));
    }

    #[test]
    fn shapes_without_mapping_are_opaque() {
        for descriptor in [
            descriptor_for::<HashSet<String>>(),
            descriptor_for::<(i32, String)>(),
            descriptor_for::<HashMap<String, i32>>(),
            descriptor_for::<Value>(),
        ] {
            assert!(
                matches!(descriptor.bare(), TypeDescriptor::Opaque(_)),
                "{descriptor} should be opaque"
            );
            assert!(matches!(
                build_schema(&descriptor, "value"),
                Err(SchemaError::UnsupportedType(_))
            ));
        }
    }

    #[test]
    fn params_for_non_record_is_unsupported() {
        assert!(matches!(
            params_for::<Vec<String>>(),
            Err(SchemaError::UnsupportedType(_))
        ));
    }
}
