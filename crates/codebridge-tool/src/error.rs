use codebridge_core::{error::SchemaError, validate::ValidationError};

/// Everything that can go wrong between receiving a tool call and handing
/// back its result.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The arguments do not match the tool's schema.  Carries every
    /// violation so the list can be fed back to the model.
    #[error("invalid arguments for `{tool}`: {source}")]
    Validation {
        tool: String,
        source: ValidationError,
    },

    #[error("couldn’t decode arguments for `{tool}`: {source}")]
    Deserialize {
        tool: String,
        source: serde_json::Error,
    },

    #[error("couldn’t encode result of `{tool}`: {source}")]
    Serialize {
        tool: String,
        source: serde_json::Error,
    },

    /// The handler itself reported a failure.
    #[error("`{tool}` failed: {message}")]
    Handler { tool: String, message: String },

    #[error("unknown tool `{0}`")]
    UnknownTool(String),

    /// The tool's schema could not be built.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ToolError {
    /// Violations when the failure was a validation failure.
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            ToolError::Validation { source, .. } => Some(source),
            _ => None,
        }
    }
}
