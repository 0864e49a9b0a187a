//! A local fake chat provider for testing purpose.
//!
//! Queue up [`ScriptedResponse`]s before submitting requests; each request
//! consumes the next response in order and replays its events without any
//! network traffic. Running out of script is an error, which doubles as the
//! provider-failure path for tests.

mod script;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use devops_copilot_model::{
    ChatEvent, ChatProvider, ChatProviderError, ChatRequest, ChatResponse,
    ErrorKind, FinishReason, OpaqueMessage,
};

pub use script::*;

/// Error returned when the script has been exhausted.
#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ChatProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

enum ResponseStep {
    Event(usize),
    Completed,
    Done,
}

/// The streamed form of one scripted response.
pub struct ScriptedChatResponse {
    script: ScriptedResponse,
    response_id: usize,
    step: ResponseStep,
}

impl ChatResponse for ScriptedChatResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ChatEvent>, Self::Error>> {
        // This type holds no self-references, pinning is not load-bearing.
        let this = self.get_mut();
        match this.step {
            ResponseStep::Event(idx) => {
                let Some(event) = this.script.events.get(idx) else {
                    this.step = ResponseStep::Completed;
                    let has_tool_call = this
                        .script
                        .events
                        .iter()
                        .any(|e| matches!(e, ScriptedEvent::ToolCall(_)));
                    let reason = if has_tool_call {
                        FinishReason::ToolCalls
                    } else {
                        FinishReason::Stop
                    };
                    return Poll::Ready(Ok(Some(ChatEvent::Completed(
                        reason,
                    ))));
                };
                this.step = ResponseStep::Event(idx + 1);
                let event = match event {
                    ScriptedEvent::TextDelta(text) => {
                        ChatEvent::TextDelta(text.clone())
                    }
                    ScriptedEvent::ToolCall(req) => {
                        ChatEvent::ToolCall(req.clone())
                    }
                };
                Poll::Ready(Ok(Some(event)))
            }
            ResponseStep::Completed => {
                this.step = ResponseStep::Done;
                Poll::Ready(Ok(None))
            }
            ResponseStep::Done => Poll::Ready(Ok(None)),
        }
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        let id = format!("scripted:{}", self.response_id);
        Some(OpaqueMessage::new(id.clone(), id))
    }
}

/// A chat provider that replays a fixed script.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: Arc<Mutex<VecDeque<ScriptedResponse>>>,
}

impl ScriptedProvider {
    /// Appends a canned response to the script.
    pub fn push_response(&self, response: ScriptedResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    /// Returns how many scripted responses are still unconsumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl ChatProvider for ScriptedProvider {
    type Error = crate::Error;
    type Response = ScriptedChatResponse;

    fn submit(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let response_id = req.messages.len();
        let next = self.script.lock().unwrap().pop_front();
        ready(match next {
            Some(script) => Ok(ScriptedChatResponse {
                script,
                response_id,
                step: ResponseStep::Event(0),
            }),
            None => Err(Error {
                message: "script exhausted",
                kind: ErrorKind::Other,
            }),
        })
    }
}
