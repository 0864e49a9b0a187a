use serde_json::Value;

use crate::OpaqueMessage;

/// A completion request submitted to the provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatRequest {
    /// The transcript messages, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Descriptors of the tools the model may invoke.
    pub tools: Vec<ToolDescriptor>,
}

/// A single role-tagged transcript message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChatMessage {
    /// The fixed system instructions.
    System(String),
    /// A line of user input.
    User(String),
    /// Assistant text.
    Assistant(String),
    /// The result of a tool invocation the model requested.
    Tool(ToolReply),
    /// A provider-private history message (usually the assistant turn that
    /// carried the tool-call requests).
    Opaque(OpaqueMessage),
}

/// The outcome of a tool invocation, fed back into the model's context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolReply {
    /// Identifier of the originating tool-call request.
    pub id: String,
    /// The reshaped return value, as text.
    pub content: String,
}

/// Metadata describing one callable operation.
///
/// Registered once at startup and immutable thereafter; the completion
/// service uses it to decide when and how to invoke the operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolDescriptor {
    /// Name of the operation.
    pub name: String,
    /// Natural-language description of what the operation does.
    pub description: String,
    /// Parameter definition as a [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}
