use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use devops_copilot_model::{
    ChatEvent, ChatProvider, ChatProviderError, ChatRequest, ChatResponse,
    FinishReason, OpaqueMessage, ToolCallRequest,
};
use tracing::Instrument;

type SubmitResult = Result<ChatOutcome, Box<dyn ChatProviderError>>;
type BoxedSubmitFuture = Pin<Box<dyn Future<Output = SubmitResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ChatRequest, Box<dyn Fn(&str) + Send + 'static>)
        -> BoxedSubmitFuture + Send + Sync
>;

/// A wrapper around a chat provider that erases the provider's concrete
/// type, so the agent doesn't need a generic parameter for it.
#[derive(Clone)]
pub struct ChatClient {
    handler_fn: HandlerFn,
}

impl ChatClient {
    /// Wraps the given provider.
    #[inline]
    pub fn new<P: ChatProvider + 'static>(provider: P) -> Self {
        let handler_fn: HandlerFn = Arc::new(move |req, on_delta| {
            let fut = provider.submit(&req);
            Box::pin(
                async move {
                    trace!("submitting a request: {req:?}");
                    let resp_or_err = fut.await;
                    drive_response::<P>(resp_or_err, on_delta).await
                }
                .instrument(trace_span!("chat client req")),
            )
        });
        Self { handler_fn }
    }

    /// Submits a request and drives the streaming response to completion,
    /// invoking `on_delta` for every text fragment as it arrives.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// events when this operation is cancelled.
    #[inline]
    pub async fn submit(
        &self,
        req: ChatRequest,
        on_delta: impl Fn(&str) + Send + 'static,
    ) -> SubmitResult {
        (self.handler_fn)(req, Box::new(on_delta)).await
    }
}

/// A completely received response from the chat client.
#[derive(Clone, Debug)]
pub struct ChatOutcome {
    /// The concatenated assistant text.
    pub text: String,
    /// The provider's raw history message, when it supplies one.
    pub opaque_msg: Option<OpaqueMessage>,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating.
    pub finish_reason: Option<FinishReason>,
}

async fn drive_response<P: ChatProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
    on_delta: Box<dyn Fn(&str) + Send + 'static>,
) -> SubmitResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("provider rejected the request: {err}");
            return Err(Box::new(err));
        }
    };

    let mut text = String::new();
    let opaque_msg;
    let mut tool_calls = Vec::new();
    let mut finish_reason = None;

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("streaming failed: {err}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            // All events received without errors; now the provider can
            // give us its raw message for the history.
            opaque_msg = pinned_resp.make_opaque_message();
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ChatEvent::TextDelta(delta) => {
                text.push_str(&delta);
                on_delta(&delta);
            }
            ChatEvent::ToolCall(req) => {
                tool_calls.push(req);
            }
            ChatEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    Ok(ChatOutcome {
        text,
        opaque_msg,
        tool_calls,
        finish_reason,
    })
}
