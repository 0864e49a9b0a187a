use devops_copilot_model::{ChatMessage, ChatRequest, ToolDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CompletionConfig;

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    pub index: Option<u32>,
    pub id: Option<String>,
    pub r#type: Option<String>,
    pub function: Option<FunctionToolCall>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Choice {
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
pub struct Delta {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub reasoning_content: Option<String>,
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning_content: Option<String>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    stream: bool,
}

// -----------
// Conversions
// -----------

pub fn encode_request(
    req: &ChatRequest,
    config: &CompletionConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(encode_message).collect(),
        tools: req.tools.iter().map(encode_tool).collect(),
        stream: true,
    }
}

fn encode_message(msg: &ChatMessage) -> Message {
    match msg {
        ChatMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ChatMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ChatMessage::Assistant(content) => Message::Assistant {
            content: Some(content.clone()),
            tool_calls: None,
            reasoning_content: None,
        },
        ChatMessage::Tool(reply) => Message::Tool {
            tool_call_id: reply.id.clone(),
            content: reply.content.clone(),
        },
        ChatMessage::Opaque(opaque) => {
            // Opaque messages from this provider always carry a `Message`.
            let Some(msg) = opaque.to_raw::<Message>() else {
                return Message::Assistant {
                    content: None,
                    tool_calls: None,
                    reasoning_content: None,
                };
            };
            msg.clone()
        }
    }
}

#[inline]
fn encode_tool(tool: &ToolDescriptor) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use devops_copilot_model::ToolReply;
    use serde_json::json;

    use super::*;
    use crate::CompletionConfigBuilder;

    #[test]
    fn test_encode_request() {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::System("You manage Azure DevOps.".to_owned()),
                ChatMessage::User("List my projects".to_owned()),
                ChatMessage::Tool(ToolReply {
                    id: "call_1".to_owned(),
                    content: "[\"Contoso\"]".to_owned(),
                }),
            ],
            tools: vec![ToolDescriptor {
                name: "list_projects".to_owned(),
                description: "Lists team projects.".to_owned(),
                parameters: json!({ "type": "object", "properties": {} }),
            }],
        };
        let config = CompletionConfigBuilder::with_api_key("xxx")
            .with_model("custom")
            .build();

        let encoded = encode_request(&request, &config);
        let json = serde_json::to_value(&encoded).unwrap();
        assert_eq!(json["model"], "custom");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "List my projects");
        assert_eq!(json["messages"][2]["tool_call_id"], "call_1");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "list_projects");
    }

    #[test]
    fn test_assistant_without_tool_calls_skips_field() {
        let msg = encode_message(&ChatMessage::Assistant("Hi".to_owned()));
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("tool_calls").is_none());
    }
}
