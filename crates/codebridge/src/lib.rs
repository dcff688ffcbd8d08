//! # `codebridge` – The umbrella crate
//!
//! One import for the whole tool-calling stack:
//!
//! | Crate                    | What it provides                                                                  |
//! |--------------------------|-----------------------------------------------------------------------------------|
//! | **`codebridge-core`**    | Type descriptors, schema builder, response validator, schema lint, reflection      |
//! | **`codebridge-tool`**    | `Tool` (validate-then-invoke) and the name-indexed `ToolBox`                       |
//! | **`codebridge-openai`**  | OpenAI *v1* `ToolSpec` / `ToolCall` wire shapes and dispatch *(optional)*          |
//!
//! The `openai` feature is enabled by default.  Disable default features to
//! stay provider-agnostic.
//!
//! ## Design philosophy
//!
//! * **Fail loudly at build time** – a type without a schema mapping is an
//!   error when the schema is built, never a silently degraded schema.
//! * **Report, don't throw, at run time** – invalid arguments from a model
//!   come back as a structured list of violations that can be fed back.
//! * **No procedural macros of our own** – schemas are reflected through
//!   [`schemars`](https://docs.rs/schemars) derives and plain functions.
//!
//! ## Quick example
//!
//! ```rust
//! use codebridge::{Tool, ToolBox};
//! use serde_json::json;
//!
//! #[derive(serde::Deserialize, schemars::JsonSchema)]
//! struct CreateUser {
//!     /// Full name
//!     name: String,
//!     #[schemars(range(min = 0))]
//!     age: i64,
//! }
//!
//! let tools = ToolBox::new().with_tool(Tool::sync(
//!     "create_user",
//!     "Creates a user.",
//!     |user: CreateUser| Ok::<_, String>(format!("{} ({})", user.name, user.age)),
//! )?);
//!
//! let schema = tools.get("create_user").unwrap().schema();
//! assert!(codebridge::validate_schema_shape(&schema.to_value()?));
//!
//! let outcome = codebridge::validate::validate(&json!({"name": "John", "age": -1}), schema)?;
//! assert!(!outcome.is_valid());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![doc(html_root_url = "https://docs.rs/codebridge/latest")]

pub use codebridge_core::*;
pub use codebridge_tool::{Tool, ToolBox, ToolError};

#[cfg(feature = "openai")]
pub use codebridge_openai as openai;
