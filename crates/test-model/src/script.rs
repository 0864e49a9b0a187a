use devops_copilot_model::ToolCallRequest;

/// An event the scripted response will deliver.
#[derive(Clone, Debug)]
pub enum ScriptedEvent {
    /// A fragment of assistant text.
    TextDelta(String),
    /// A tool invocation request.
    ToolCall(ToolCallRequest),
}

/// One canned assistant response.
///
/// The finish reason is derived from the events: if any of them is a tool
/// call, the response completes with `ToolCalls`, otherwise with `Stop`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedResponse {
    pub(crate) events: Vec<ScriptedEvent>,
}

impl ScriptedResponse {
    /// Creates a response delivering the given events in order.
    #[inline]
    pub fn with_events<I>(events: I) -> Self
    where
        I: IntoIterator<Item = ScriptedEvent>,
    {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Creates a response that streams `text` as a single delta.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self::with_events([ScriptedEvent::TextDelta(text.into())])
    }
}
