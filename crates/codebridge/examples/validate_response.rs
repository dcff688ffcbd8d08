use codebridge::builder::build_function_schema;
use codebridge::descriptor::{
    CallableMeta, Constraints, EnumType, Field, FieldMeta, Param, Record, TypeDescriptor,
};
use codebridge::validate::{ValidationOutcome, Validator};
use codebridge::{normalize_key_order, validate_schema_shape};
use serde_json::json;

/// ---------------------------------------------------------------------------
/// Example  –  Hand-written descriptors and response validation
///
/// Describes a `register_user` callable without any derive, prints its
/// schema and checks a few candidate argument objects against it.
///
/// **Running the demo**
/// ```bash
/// cargo run -p codebridge --example validate_response
/// ```
/// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    let address = Record::new("Address")
        .with_description("Postal address")
        .with_field(Field::new("street", TypeDescriptor::string()))
        .with_field(
            Field::new(
                "zip_code",
                TypeDescriptor::string().annotated(
                    FieldMeta::described("Five digit ZIP code")
                        .with_constraints(Constraints::default().pattern(r"^\d{5}$")),
                ),
            ),
        );

    let meta = CallableMeta::new("register_user")
        .with_doc("Registers a user with a favourite color.")
        .with_returns(TypeDescriptor::string());

    let schema = build_function_schema(
        &meta,
        &[
            Param::required("name", TypeDescriptor::string().described("Full name")),
            Param::required(
                "age",
                TypeDescriptor::integer().annotated(
                    FieldMeta::described("Age in years")
                        .with_constraints(Constraints::default().ge(0).le(150)),
                ),
            ),
            Param::required("color", EnumType::new("Color", ["red", "green", "blue"]).into()),
            Param::required("addresses", TypeDescriptor::list(address.into())),
            Param::with_default(
                "nickname",
                TypeDescriptor::optional(TypeDescriptor::string()),
                json!(null),
            ),
        ],
    )?;

    let rendered = normalize_key_order(schema.to_value()?);
    println!("{}", serde_json::to_string_pretty(&rendered)?);
    println!("schema shape ok: {}", validate_schema_shape(&rendered));

    let validator = Validator::compile(&schema)?;
    let candidates = [
        json!({
            "name": "John",
            "age": 30.0,
            "color": "red",
            "addresses": [{"street": "Main St 1", "zip_code": "12345"}]
        }),
        json!({
            "age": -1,
            "color": "purple",
            "addresses": [
                {"street": "Main St 1", "zip_code": "12345"},
                {"street": 7, "zip_code": "ABCDE"}
            ]
        }),
    ];

    for candidate in &candidates {
        match validator.validate(candidate) {
            ValidationOutcome::Valid(normalized) => println!("valid: {normalized}"),
            ValidationOutcome::Invalid(error) => println!("{error}"),
        }
    }

    Ok(())
}
