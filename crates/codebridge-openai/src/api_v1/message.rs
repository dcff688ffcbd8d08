use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolRole {
    Tool,
}

/// The `{"role": "tool", ...}` message answering a [`super::ToolCall`].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ToolMessage {
    pub role: ToolRole,
    pub tool_call_id: String,
    pub content: String,
}

impl ToolMessage {
    pub fn new(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ToolRole::Tool,
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}
