use codebridge_tool::ToolError;

pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Everything that can fail while decoding or dispatching a tool call.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("couldn’t decode tool call arguments: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("OpenAI format error: {0}")]
    Format(String),

    #[error(transparent)]
    Tool(#[from] ToolError),
}
