//! OpenAI *v1* wire shapes for tool calling.
//!
//! [`api_v1::ToolSpec`] is what goes into the `tools` array of a chat
//! completion request; [`api_v1::ToolCall`] is what comes back in an
//! assistant message.  No HTTP client lives here: serialise the specs into
//! whatever request you send and feed the returned calls to
//! [`api_v1::ToolCall::dispatch`].

pub mod api_v1;
pub mod error;
