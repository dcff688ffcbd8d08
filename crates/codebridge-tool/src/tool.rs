use std::{fmt, future::Future, sync::Arc};

use codebridge_core::{
    builder::build_function_schema,
    descriptor::CallableMeta,
    reflect::{descriptor_for, params_for},
    schema::FunctionSchema,
    validate::{ValidationOutcome, Validator, ValidatorOptions},
};
use futures_util::future::{BoxFuture, FutureExt};
use schemars::JsonSchema;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ToolError;

type Handler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ToolError>> + Send + Sync>;

/// A callable paired with its function schema.
///
/// The schema is derived once from the argument type `Args` and the
/// validator compiled once; [`Tool::invoke`] then checks every incoming
/// argument object before the handler ever sees it.
///
/// ```rust
/// use codebridge_tool::Tool;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Add {
///     a: i64,
///     b: i64,
/// }
///
/// let tool = Tool::sync("add_numbers", "Adds two integers.", |args: Add| {
///     Ok::<_, String>(args.a + args.b)
/// })?;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// assert_eq!(tool.invoke(json!({"a": 1, "b": 2})).await?, json!(3));
/// assert!(tool.invoke(json!({"a": "one"})).await.is_err());
/// # Ok::<(), codebridge_tool::ToolError>(())
/// # })?;
/// # Ok::<(), codebridge_tool::ToolError>(())
/// ```
#[derive(Clone)]
pub struct Tool {
    schema: FunctionSchema,
    validator: Validator,
    handler: Handler,
}

impl Tool {
    /// Wrap a synchronous handler.
    pub fn sync<Args, R, E, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> Result<Self, ToolError>
    where
        Args: JsonSchema + DeserializeOwned + Send + 'static,
        R: JsonSchema + Serialize + Send + 'static,
        E: fmt::Display + Send + 'static,
        F: Fn(Args) -> Result<R, E> + Send + Sync + 'static,
    {
        let name = name.into();
        let schema = function_schema::<Args, R>(&name, description.into(), false)?;

        let tool = name.clone();
        let handler: Handler = Arc::new(move |arguments: Value| {
            let result = decode::<Args>(&tool, arguments).and_then(|args| {
                let output = f(args);
                encode(&tool, output)
            });
            futures_util::future::ready(result).boxed()
        });

        Self::assemble(schema, handler)
    }

    /// Wrap an asynchronous handler.  The schema carries `"async": true`.
    pub fn asynchronous<Args, R, E, Fut, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        f: F,
    ) -> Result<Self, ToolError>
    where
        Args: JsonSchema + DeserializeOwned + Send + 'static,
        R: JsonSchema + Serialize + Send + 'static,
        E: fmt::Display + Send + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
    {
        let name = name.into();
        let schema = function_schema::<Args, R>(&name, description.into(), true)?;

        let tool = name.clone();
        let handler: Handler = Arc::new(move |arguments: Value| {
            let tool = tool.clone();
            match decode::<Args>(&tool, arguments) {
                Ok(args) => {
                    let pending = f(args);
                    async move { encode(&tool, pending.await) }.boxed()
                }
                Err(e) => futures_util::future::ready(Err(e)).boxed(),
            }
        });

        Self::assemble(schema, handler)
    }

    fn assemble(schema: FunctionSchema, handler: Handler) -> Result<Self, ToolError> {
        let validator = Validator::compile(&schema)?;
        Ok(Self {
            schema,
            validator,
            handler,
        })
    }

    /// Replace the validator options, e.g. to disable integral float coercion.
    pub fn with_validator_options(mut self, options: ValidatorOptions) -> Result<Self, ToolError> {
        self.validator = Validator::compile_with(&self.schema, options)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn description(&self) -> &str {
        &self.schema.function.description
    }

    pub fn is_async(&self) -> bool {
        self.schema.function.is_async
    }

    pub fn schema(&self) -> &FunctionSchema {
        &self.schema
    }

    /// Check arguments proposed by a model without invoking the handler.
    pub fn validate_response(&self, arguments: &Value) -> ValidationOutcome {
        self.validator.validate(arguments)
    }

    /// Validate `arguments`, then decode them and call the handler.
    ///
    /// The handler receives the normalised arguments, so `30.0` for an
    /// integer field arrives as `30`.
    pub async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let arguments = match self.validator.validate(&arguments) {
            ValidationOutcome::Valid(normalized) => normalized,
            ValidationOutcome::Invalid(error) => {
                tracing::error!(tool = self.name(), %error, "rejected tool arguments");
                return Err(ToolError::Validation {
                    tool: self.name().to_owned(),
                    source: error,
                });
            }
        };

        tracing::debug!(tool = self.name(), "invoking tool");
        (self.handler)(arguments).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

fn function_schema<Args, R>(
    name: &str,
    description: String,
    is_async: bool,
) -> Result<FunctionSchema, ToolError>
where
    Args: JsonSchema,
    R: JsonSchema,
{
    let meta = CallableMeta::new(name)
        .with_doc(description)
        .with_async(is_async)
        .with_returns(descriptor_for::<R>());
    let params = params_for::<Args>()?;

    Ok(build_function_schema(&meta, &params)?)
}

fn decode<Args: DeserializeOwned>(tool: &str, arguments: Value) -> Result<Args, ToolError> {
    serde_json::from_value(arguments).map_err(|source| ToolError::Deserialize {
        tool: tool.to_owned(),
        source,
    })
}

fn encode<R: Serialize, E: fmt::Display>(tool: &str, output: Result<R, E>) -> Result<Value, ToolError> {
    let output = output.map_err(|e| ToolError::Handler {
        tool: tool.to_owned(),
        message: e.to_string(),
    })?;
    serde_json::to_value(output).map_err(|source| ToolError::Serialize {
        tool: tool.to_owned(),
        source,
    })
}
