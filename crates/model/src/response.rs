use std::pin::Pin;
use std::task::{self, Poll};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::OpaqueMessage;
use crate::provider::ChatProviderError;

/// A streaming response from the completion service.
pub trait ChatResponse: Sized + Send + 'static {
    /// The error type that may be produced while streaming.
    type Error: ChatProviderError;

    /// Attempts to pull out the next event from the response.
    ///
    /// # Return value
    ///
    /// - `Poll::Pending` — the next event is not ready yet; the current task
    ///   will be woken when it may be.
    /// - `Poll::Ready(Ok(Some(event)))` — an event is available and more may
    ///   follow.
    /// - `Poll::Ready(Ok(None))` — the response has completed.
    /// - `Poll::Ready(Err(error))` — streaming failed.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<ChatEvent>, Self::Error>>;

    /// Makes an [`OpaqueMessage`] preserving this response for the history.
    ///
    /// Should only be called once all events have been polled; providers
    /// must return the same message for one response. Providers that don't
    /// need history fidelity can leave this returning `None`.
    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        None
    }
}

/// Why the model stopped producing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FinishReason {
    /// The model wants its tool calls executed before continuing.
    ToolCalls,
    /// The model finished its text.
    Stop,
}

/// A tool invocation requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique identifier for this request.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments, matching the descriptor's parameter schema.
    pub arguments: Value,
}

/// One event pulled from a streaming response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatEvent {
    /// The response has been completed.
    Completed(FinishReason),
    /// A fragment of assistant text.
    TextDelta(String),
    /// A tool invocation request.
    ToolCall(ToolCallRequest),
}
