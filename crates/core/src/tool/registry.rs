use std::collections::HashMap;
use std::pin::Pin;

use devops_copilot_model::{ToolCallRequest, ToolDescriptor};

use crate::tool::{Error, Tool, ToolObject, ToolResult};

/// The set of tools registered with the agent, keyed by name.
///
/// Registered once at startup and immutable thereafter.
#[derive(Default)]
pub struct Registry {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Registry {
    pub(crate) fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_owned();
            tool_map.insert(name, tool);
        }
        Self { tools: tool_map }
    }

    /// Returns the descriptors handed to the completion service.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Starts the invocation a request names.
    ///
    /// An unknown tool name yields an immediately ready `UnknownTool` error
    /// instead of being dropped, so every request still gets a reply the
    /// model can see.
    pub fn dispatch(
        &self,
        req: &ToolCallRequest,
    ) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> {
        let Some(tool) = self.tools.get(&req.name) else {
            warn!("tool not found: {}", req.name);
            let err = Error::unknown_tool().with_reason(req.name.clone());
            return Box::pin(std::future::ready(Err(err)));
        };
        trace!("dispatching tool {} ({})", req.name, req.id);
        tool.execute(req.arguments.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{AnyTool, ErrorKind};

    static EMPTY_SCHEMA: &Value = &Value::Null;

    struct TestTool;

    impl Tool for TestTool {
        type Input = TestInput;

        fn name(&self) -> &str {
            "test_tool"
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn parameter_schema(&self) -> &Value {
            EMPTY_SCHEMA
        }

        fn execute(
            &self,
            input: TestInput,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(input.echo))
        }
    }

    #[derive(serde::Deserialize)]
    struct TestInput {
        echo: String,
    }

    fn registry() -> Registry {
        Registry::with_tools(vec![Box::new(AnyTool(TestTool))])
    }

    #[tokio::test]
    async fn test_dispatch() {
        let result = registry()
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "test_tool".to_owned(),
                arguments: json!({ "echo": "hello" }),
            })
            .await;
        assert_eq!(result.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = registry()
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "other_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::UnknownTool);
    }

    #[tokio::test]
    async fn test_malformed_arguments() {
        let result = registry()
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "test_tool".to_owned(),
                arguments: json!({ "echo": 42 }),
            })
            .await;
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_descriptors() {
        let descriptors = registry().descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "test_tool");
    }
}
