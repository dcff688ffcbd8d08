use codebridge_core::schema::FunctionSchema;
use indexmap::IndexMap;
use serde_json::Value;

use crate::{error::ToolError, tool::Tool};

/// Registry of tools, keyed by name, in registration order.
///
/// Hand [`ToolBox::schemas`] to the model, then route each returned call
/// through [`ToolBox::invoke`].
#[derive(Debug, Clone, Default)]
pub struct ToolBox {
    tools: IndexMap<String, Tool>,
}

impl ToolBox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool`, replacing any tool registered under the same name.
    pub fn register(&mut self, tool: Tool) -> Option<Tool> {
        let previous = self.tools.insert(tool.name().to_owned(), tool);
        if let Some(previous) = &previous {
            tracing::warn!(tool = previous.name(), "replacing registered tool");
        }
        previous
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Schemas of every registered tool, in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &FunctionSchema> {
        self.tools.values().map(Tool::schema)
    }

    pub async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_owned()))?;
        tool.invoke(arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct Pair {
        a: i64,
        b: i64,
    }

    fn toolbox() -> ToolBox {
        ToolBox::new()
            .with_tool(Tool::sync("add", "Adds.", |p: Pair| Ok::<_, String>(p.a + p.b)).unwrap())
            .with_tool(Tool::sync("mul", "Multiplies.", |p: Pair| Ok::<_, String>(p.a * p.b)).unwrap())
    }

    #[test]
    fn schemas_follow_registration_order() {
        let names: Vec<_> = toolbox().schemas().map(|s| s.name().to_owned()).collect();
        assert_eq!(names, ["add", "mul"]);
    }

    #[test]
    fn registering_same_name_replaces() {
        let mut tools = toolbox();
        let replaced = tools.register(
            Tool::sync("add", "Adds twice.", |p: Pair| Ok::<_, String>(2 * (p.a + p.b))).unwrap(),
        );

        assert!(replaced.is_some());
        assert_eq!(tools.len(), 2);
        assert_eq!(tools.get("add").unwrap().description(), "Adds twice.");
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let tools = toolbox();

        assert!(tools.contains("mul"));
        assert_eq!(tools.invoke("mul", json!({"a": 3, "b": 4})).await.unwrap(), json!(12));
        assert!(matches!(
            tools.invoke("div", json!({})).await,
            Err(ToolError::UnknownTool(name)) if name == "div"
        ));
    }
}
