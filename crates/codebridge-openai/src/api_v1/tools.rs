use codebridge_core::schema::{FunctionSchema, ParameterSchema};
use codebridge_tool::ToolBox;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::ToolMessage;
use crate::error::{OpenAiError, Result};
use crate::impl_builder_methods;

/// Entry of the `tools` array of a chat completion request.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolSpec {
    pub function: ToolFunctionSpec,
    pub r#type: ToolType,
}

impl From<&FunctionSchema> for ToolSpec {
    fn from(value: &FunctionSchema) -> Self {
        ToolSpec {
            function: ToolFunctionSpec {
                name: value.function.name.clone(),
                description: value.function.description.clone(),
                parameters: value.function.parameters.clone(),
                strict: None,
            },
            r#type: ToolType::Function,
        }
    }
}

impl From<FunctionSchema> for ToolSpec {
    fn from(value: FunctionSchema) -> Self {
        ToolSpec::from(&value)
    }
}

impl ToolSpec {
    pub fn strict(mut self, strict: bool) -> Self {
        self.function = self.function.strict(strict);
        self
    }
}

/// Specs for every tool in `tools`, in registration order.
pub fn tool_specs(tools: &ToolBox) -> Vec<ToolSpec> {
    tools.schemas().map(ToolSpec::from).collect()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolFunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

impl_builder_methods!(ToolFunctionSpec, strict: bool);

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Function,
}

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    None,
    Auto,
    Required,
}

/// A tool call proposed by the model in an assistant message.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub function: ToolCallFunction,
    pub r#type: ToolType,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ToolCallFunction {
    pub name: String,
    /// Usually a JSON *string* holding the encoded arguments; some
    /// compatible backends send the object directly.
    pub arguments: Value,
}

impl ToolCall {
    /// Decoded argument object.
    pub fn arguments(&self) -> Result<Value> {
        let arguments = match &self.function.arguments {
            Value::String(encoded) if encoded.trim().is_empty() => Value::Object(Default::default()),
            Value::String(encoded) => serde_json::from_str(encoded)?,
            other => other.clone(),
        };

        if arguments.is_object() {
            Ok(arguments)
        } else {
            Err(OpenAiError::Format(format!(
                "arguments of `{}` must be a JSON object",
                self.function.name
            )))
        }
    }

    /// Decode the arguments and invoke the matching tool.
    pub async fn dispatch(&self, tools: &ToolBox) -> Result<Value> {
        let arguments = self.arguments()?;

        #[cfg(feature = "tracing")]
        tracing::debug!(call = %self.id, tool = %self.function.name, "dispatching tool call");

        Ok(tools.invoke(&self.function.name, arguments).await?)
    }

    /// Dispatch and wrap the outcome into the `tool` message answering this
    /// call.  Failures, validation errors included, become the message
    /// content so the model can correct itself.
    pub async fn respond(&self, tools: &ToolBox) -> ToolMessage {
        let content = match self.dispatch(tools).await {
            Ok(Value::String(text)) => text,
            Ok(value) => value.to_string(),
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(call = %self.id, %error, "tool call failed");

                format!("error: {error}")
            }
        };
        ToolMessage::new(self.id.clone(), content)
    }
}
