//! Provider-agnostic heart of Codebridge.
//!
//! * [`descriptor`]: the closed set of type shapes a tool parameter can have.
//! * [`builder`]: turns descriptors into `{"type": "function", ...}` schemas.
//! * [`validate`]: checks LLM-produced arguments against such a schema.
//! * [`lint`] and [`normalize`]: advisory shape check and cosmetic key order.
//! * [`reflect`]: derives descriptors from any `schemars::JsonSchema` type.
//!
//! Everything here is synchronous and free of shared state, so schemas and
//! validators can be built and used from any thread.

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod lint;
pub mod normalize;
pub mod reflect;
pub mod schema;
pub mod validate;

pub use builder::{build_function_schema, build_parameters, build_schema};
pub use error::{Result, SchemaError};
pub use lint::validate_schema_shape;
pub use normalize::normalize_key_order;
pub use schema::FunctionSchema;
pub use validate::{ValidationOutcome, Validator};
