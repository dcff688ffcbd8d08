use codebridge::builder::build_function_schema;
use codebridge::descriptor::{
    CallableMeta, Constraints, EnumType, Field, FieldMeta, Param, Record, TypeDescriptor,
};
use codebridge::{normalize_key_order, validate_schema_shape};
use serde_json::{Value, json};

fn generate(meta: CallableMeta, params: &[Param]) -> Value {
    let schema = build_function_schema(&meta, params)
        .unwrap()
        .to_value()
        .unwrap();
    assert!(validate_schema_shape(&schema), "lint rejected {schema:#}");
    schema
}

fn single(doc: &str, ty: TypeDescriptor) -> Value {
    let schema = generate(
        CallableMeta::new("f")
            .with_doc(doc)
            .with_returns(TypeDescriptor::string()),
        &[Param::required("value", ty)],
    );
    schema["function"]["parameters"]["properties"]["value"].clone()
}

fn address() -> Record {
    Record::new("Address")
        .with_field(Field::new("street", TypeDescriptor::string().described("The street address")))
        .with_field(Field::new("city", TypeDescriptor::string().described("The city")))
}

#[test]
fn primitives_carry_type_and_description() {
    for (ty, expected) in [
        (TypeDescriptor::string(), "string"),
        (TypeDescriptor::number(), "number"),
        (TypeDescriptor::integer(), "integer"),
        (TypeDescriptor::boolean(), "boolean"),
    ] {
        let node = single("", ty.described("A value"));
        assert_eq!(node, json!({"type": expected, "description": "A value"}));
    }
}

#[test]
fn array_of_strings() {
    let node = single("", TypeDescriptor::list(TypeDescriptor::string()).described("An array of strings"));

    assert_eq!(node["type"], "array");
    assert_eq!(node["items"]["type"], "string");
    assert_eq!(node["description"], "An array of strings");
}

#[test]
fn enum_and_literal_render_as_string_enums() {
    let color = single(
        "",
        TypeDescriptor::from(EnumType::new("Color", ["red", "green", "blue"])).described("An enum value"),
    );
    assert_eq!(color["type"], "string");
    assert_eq!(color["enum"], json!(["red", "green", "blue"]));

    let constant = single("", TypeDescriptor::literal(["constant_value"]));
    assert_eq!(constant["enum"], json!(["constant_value"]));
    assert_eq!(constant["description"], "value");

    let options = single("", TypeDescriptor::literal(["option1", "option2"]).described("A literal value"));
    assert_eq!(options["enum"], json!(["option1", "option2"]));
}

#[test]
fn create_user_nests_records_and_lists() {
    let user = Record::new("User")
        .with_field(Field::new("name", TypeDescriptor::string()).with_description("The name of the user"))
        .with_field(Field::new("age", TypeDescriptor::integer()).with_description("The age of the user"))
        .with_field(
            Field::new("address", address().into()).with_description("The address of the user"),
        )
        .with_field(Field::new("friends", TypeDescriptor::list(address().into())));

    let schema = generate(
        CallableMeta::new("create_user").with_doc("Creates a new user"),
        &[Param::required("user", TypeDescriptor::from(user).described("The user object to create"))],
    );

    let parameters = &schema["function"]["parameters"];
    assert_eq!(parameters["required"], json!(["user"]));
    assert_eq!(schema["function"]["description"], "Creates a new user");

    let user = &parameters["properties"]["user"];
    assert_eq!(user["description"], "The user object to create");
    let props = &user["properties"];
    assert_eq!(props["name"]["type"], "string");
    assert_eq!(props["name"]["description"], "The name of the user");
    assert_eq!(props["age"]["type"], "integer");
    assert_eq!(props["address"]["type"], "object");
    assert_eq!(props["address"]["description"], "The address of the user");
    assert!(props["address"]["properties"].get("street").is_some());
    assert_eq!(props["friends"]["type"], "array");
    assert_eq!(props["friends"]["items"]["type"], "object");
    assert_eq!(user["required"], json!(["name", "age", "address", "friends"]));
}

#[test]
fn list_of_objects_survives_key_normalisation() {
    let simple = Record::new("SimpleObject")
        .with_field(Field::new("property_one", TypeDescriptor::string()).with_description("The first property"))
        .with_field(Field::new("property_two", TypeDescriptor::string()).with_description("The second property"));

    let schema = generate(
        CallableMeta::new("process_objects").with_doc("Processes a list of objects"),
        &[Param::required(
            "objects",
            TypeDescriptor::list(simple.into()).described("A list of objects"),
        )],
    );
    let schema = normalize_key_order(schema);
    assert!(validate_schema_shape(&schema));

    let objects = &schema["function"]["parameters"]["properties"]["objects"];
    assert_eq!(objects.as_object().unwrap().keys().next().unwrap(), "description");
    assert_eq!(objects["items"]["type"], "object");
    assert_eq!(objects["items"]["properties"]["property_two"]["description"], "The second property");
}

#[test]
fn no_parameters() {
    let schema = generate(CallableMeta::new("no_params").with_doc("Function with no parameters"), &[]);

    assert_eq!(schema["function"]["parameters"]["properties"], json!({}));
    assert_eq!(schema["function"]["parameters"]["required"], json!([]));
}

#[test]
fn union_types_use_one_of() {
    let node = single(
        "",
        TypeDescriptor::union([TypeDescriptor::integer(), TypeDescriptor::string()]).described("An int or str value"),
    );

    assert!(node.get("type").is_none());
    let types: Vec<&str> = node["oneOf"]
        .as_array()
        .unwrap()
        .iter()
        .map(|option| option["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, ["integer", "string"]);
}

#[test]
fn optional_parameters_are_nullable_with_default() {
    let schema = generate(
        CallableMeta::new("optional_params"),
        &[
            Param::required("required_value", TypeDescriptor::string().described("A required value")),
            Param::with_default(
                "optional_value",
                TypeDescriptor::optional(TypeDescriptor::string()).described("An optional value"),
                Value::Null,
            ),
        ],
    );

    let properties = &schema["function"]["parameters"]["properties"];
    assert_eq!(
        properties["optional_value"],
        json!({"type": "string", "description": "An optional value", "nullable": true, "default": null})
    );
    assert_eq!(schema["function"]["parameters"]["required"], json!(["required_value"]));
}

#[test]
fn numeric_bounds() {
    let positive = single(
        "",
        TypeDescriptor::integer().annotated(
            FieldMeta::described("A positive number").with_constraints(Constraints::default().gt(0)),
        ),
    );
    assert_eq!(positive["exclusiveMinimum"], json!(0));

    let rank = single(
        "",
        TypeDescriptor::integer()
            .annotated(FieldMeta::default().with_constraints(Constraints::default().ge(1).le(10))),
    );
    assert_eq!((rank["minimum"].clone(), rank["maximum"].clone()), (json!(1), json!(10)));

    let temperature = single(
        "",
        TypeDescriptor::number().annotated(
            FieldMeta::default().with_constraints(Constraints::default().ge(-273.15).le(1000.0)),
        ),
    );
    assert_eq!(temperature["minimum"].as_f64(), Some(-273.15));
    assert_eq!(temperature["maximum"].as_f64(), Some(1000.0));
}

#[test]
fn enum_in_field_keeps_member_values() {
    let schema = generate(
        CallableMeta::new("get_current_weather").with_doc("Get the current weather"),
        &[
            Param::required(
                "location",
                TypeDescriptor::string().described("The city and state, e.g. San Francisco, CA"),
            ),
            Param::required(
                "format",
                TypeDescriptor::from(EnumType::new("TemperatureUnit", ["celsius", "fahrenheit"]))
                    .described("The temperature unit to use. Infer this from the user's location."),
            ),
        ],
    );

    let format = &schema["function"]["parameters"]["properties"]["format"];
    assert_eq!(format["enum"], json!(["celsius", "fahrenheit"]));
}

#[test]
fn bound_methods_and_async_callables() {
    let params = [
        Param::required("self", TypeDescriptor::opaque("Calculator")),
        Param::required("a", TypeDescriptor::integer().described("The first number")),
        Param::required("b", TypeDescriptor::integer().described("The second number")),
    ];
    let method = generate(
        CallableMeta::new("add")
            .with_doc("Adds two integers and returns the sum.")
            .with_bound_method(true),
        &params,
    );
    assert_eq!(method["function"]["parameters"]["required"], json!(["a", "b"]));
    assert!(method["function"].get("async").is_none());

    let asynchronous = generate(
        CallableMeta::new("async_func").with_async(true),
        &[Param::required("value", TypeDescriptor::string())],
    );
    assert_eq!(asynchronous["function"]["async"], json!(true));
}

#[test]
fn unsupported_shapes_fail_the_build() {
    for ty in [
        TypeDescriptor::opaque("tuple"),
        TypeDescriptor::opaque("set"),
        TypeDescriptor::Null,
    ] {
        assert!(matches!(
            build_function_schema(&CallableMeta::new("f"), &[Param::required("value", ty)]),
            Err(codebridge::SchemaError::UnsupportedType(_))
        ));
    }
}
