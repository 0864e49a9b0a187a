
use std::fmt::{self, Display};
use std::sync::Arc;

use devops_copilot_model::{
    ChatMessage, ChatProvider, ChatProviderError, ChatRequest, ToolReply,
};

use crate::chat_client::ChatClient;
use crate::tool::{AnyTool, Registry, Tool, ToolObject};
use crate::transcript::Transcript;

/// [`Agent`] builder.
pub struct AgentBuilder {
    chat_client: ChatClient,
    system_prompt: String,
    tools: Vec<Box<dyn ToolObject>>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified chat provider.
    #[inline]
    pub fn with_provider<P: ChatProvider + 'static>(provider: P) -> Self {
        Self {
            chat_client: ChatClient::new(provider),
            system_prompt: String::new(),
            tools: vec![],
        }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent {
        Agent {
            chat_client: self.chat_client,
            registry: Registry::with_tools(self.tools),
            transcript: Transcript::with_system_prompt(self.system_prompt),
        }
    }
}

/// Error returned when a conversation turn could not be completed.
///
/// The transcript keeps the user's input, so the operator can simply try
/// again on the next prompt.
#[derive(Debug)]
pub struct TurnError(Box<dyn ChatProviderError>);

impl TurnError {
    /// The provider error that ended the turn.
    #[inline]
    pub fn provider_error(&self) -> &dyn ChatProviderError {
        self.0.as_ref()
    }
}

impl Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TurnError {}

/// The chat orchestrator.
///
/// One turn is fully processed before the next one starts: the user input
/// is appended to the transcript, the transcript plus the registered tool
/// descriptors are submitted to the completion service, requested tool
/// calls are executed and their results fed back, and the loop repeats
/// until the model stops with text. Nothing overlaps across turns.
pub struct Agent {
    chat_client: ChatClient,
    registry: Registry,
    transcript: Transcript,
}

impl Agent {
    /// Runs one conversation turn.
    ///
    /// `on_delta` observes every assistant text fragment as it streams in.
    /// The returned string is the turn's complete assistant text.
    pub async fn run_turn(
        &mut self,
        input: &str,
        on_delta: impl Fn(&str) + Send + Sync + 'static,
    ) -> Result<String, TurnError> {
        // Bound the context before taking on new input.
        let evicted = self.transcript.trim();
        if evicted > 0 {
            debug!("evicted {evicted} transcript entries");
        }

        self.transcript.push_user(input);
        let on_delta = Arc::new(on_delta);

        let mut turn_text = String::new();
        loop {
            let req = ChatRequest {
                messages: self.transcript.to_messages(),
                tools: self.registry.descriptors(),
            };
            let outcome = self
                .chat_client
                .submit(req, {
                    let on_delta = Arc::clone(&on_delta);
                    move |delta| on_delta(delta)
                })
                .await
                .map_err(TurnError)?;

            turn_text.push_str(&outcome.text);

            // Prefer the provider's raw message so tool-call context
            // survives in the history; otherwise downgrade to plain text.
            let msg = match outcome.opaque_msg {
                Some(opaque) => ChatMessage::Opaque(opaque),
                None => ChatMessage::Assistant(outcome.text),
            };
            self.transcript.push_message(msg);

            if outcome.tool_calls.is_empty() {
                break;
            }

            // Requested calls are independent and order-insensitive; run
            // them one after another and reply to every single one.
            for call in outcome.tool_calls {
                let content = match self.registry.dispatch(&call).await {
                    Ok(content) => content,
                    Err(err) => {
                        warn!("tool call {} failed: {err}", call.name);
                        String::new()
                    }
                };
                self.transcript.push_tool_reply(ToolReply {
                    id: call.id,
                    content,
                });
            }
        }

        Ok(turn_text)
    }

    /// The conversation history so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
