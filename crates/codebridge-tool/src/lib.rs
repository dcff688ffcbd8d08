//! Explicit validate-then-invoke composition for LLM tools.
//!
//! A [`Tool`] owns the function schema derived from its argument type and a
//! compiled validator.  Arguments coming back from a model are checked
//! against that schema before the handler runs; a failure carries every
//! violation so it can be reported back to the model.
//!
//! [`ToolBox`] indexes tools by name for dispatch.

mod error;
mod tool;
mod toolbox;

pub use error::ToolError;
pub use tool::Tool;
pub use toolbox::ToolBox;
