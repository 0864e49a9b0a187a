use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use devops_copilot_model::{
    ChatEvent, ChatResponse, ErrorKind, FinishReason, OpaqueMessage,
    ToolCallRequest,
};
use pin_project_lite::pin_project;
use serde_json::Value;

use crate::Error;
use crate::proto::{ChatCompletionChunk, Message, ToolCall};
use crate::sse::SseReader;

/// Incrementally assembles the streamed chunks into events and a complete
/// assistant message.
struct Assembler {
    reader: SseReader,
    id: Option<String>,
    text: String,
    reasoning: Option<String>,
    tool_calls: Vec<ToolCall>,
    // Events parsed but not yet delivered to the caller.
    queued: VecDeque<ChatEvent>,
    finish_reason: Option<FinishReason>,
    exhausted: bool,
}

impl Assembler {
    fn new(reader: SseReader) -> Self {
        Self {
            reader,
            id: None,
            text: String::new(),
            reasoning: None,
            tool_calls: Vec::new(),
            queued: VecDeque::new(),
            finish_reason: None,
            exhausted: false,
        }
    }

    async fn advance(mut self) -> Result<(Self, Option<ChatEvent>), Error> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Ok((self, Some(event)));
            }
            if self.exhausted {
                return Ok((self, None));
            }

            let sse_event = self
                .reader
                .next_event()
                .await
                .map_err(|err| {
                    Error::new(format!("{err:?}"), ErrorKind::Other)
                })?;
            match sse_event {
                Some(data) if data != "[DONE]" => {
                    trace!("got sse event: {data}");
                    self.ingest(&data)?;
                }
                _ => self.flush_end(),
            }
        }
    }

    /// Folds one chunk into the partial state, queueing any event it
    /// completes.
    fn ingest(&mut self, data: &str) -> Result<(), Error> {
        let mut chunk = serde_json::from_str::<ChatCompletionChunk>(data)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Other))?;
        if self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id {
            return Err(Error::new("chunk id mismatch", ErrorKind::Other));
        }

        let Some(choice) = chunk.choices.pop() else {
            // Trailing chunks (usage reports) have no choices.
            return Ok(());
        };

        if let Some(finish_reason) = choice.finish_reason {
            self.finish_reason = Some(if finish_reason == "tool_calls" {
                FinishReason::ToolCalls
            } else {
                FinishReason::Stop
            });
        }

        if let Some(content) = choice.delta.content {
            self.text.push_str(&content);
            self.queued.push_back(ChatEvent::TextDelta(content));
        }
        if let Some(reasoning) = &choice.delta.reasoning_content {
            self.reasoning.get_or_insert_default().push_str(reasoning);
        }
        if let Some(tool_calls) = choice.delta.tool_calls {
            for fragment in tool_calls {
                self.patch_tool_call(fragment);
            }
        }
        Ok(())
    }

    /// Tool calls arrive as fragments keyed by index; each fragment appends
    /// to the id/name/arguments of the call it belongs to.
    fn patch_tool_call(&mut self, fragment: ToolCall) {
        let Some(partial) = self
            .tool_calls
            .iter_mut()
            .find(|t| t.index == fragment.index)
        else {
            self.tool_calls.push(fragment);
            return;
        };
        if let Some(id) = fragment.id {
            partial.id.get_or_insert_default().push_str(&id);
        }
        if let Some(ty) = fragment.r#type {
            partial.r#type.get_or_insert_default().push_str(&ty);
        }
        let Some(function) = fragment.function else {
            return;
        };
        match partial.function {
            Some(ref mut partial_fn) => {
                if let Some(name) = function.name {
                    partial_fn.name.get_or_insert_default().push_str(&name);
                }
                if let Some(arguments) = function.arguments {
                    partial_fn
                        .arguments
                        .get_or_insert_default()
                        .push_str(&arguments);
                }
            }
            None => partial.function = Some(function),
        }
    }

    /// The stream has ended: queue the fully assembled tool calls, then the
    /// finish reason if the server sent one.
    fn flush_end(&mut self) {
        self.exhausted = true;
        for tool_call in &self.tool_calls {
            let id = tool_call.id.clone().unwrap_or_default();
            let name = tool_call
                .function
                .as_ref()
                .and_then(|f| f.name.clone())
                .unwrap_or_default();
            let arguments = tool_call
                .function
                .as_ref()
                .and_then(|f| f.arguments.as_deref())
                .and_then(|args| serde_json::from_str::<Value>(args).ok())
                .unwrap_or_default();
            self.queued.push_back(ChatEvent::ToolCall(ToolCallRequest {
                id,
                name,
                arguments,
            }));
        }
        if let Some(reason) = self.finish_reason {
            self.queued.push_back(ChatEvent::Completed(reason));
        }
    }

    fn full_message(&self) -> Option<(String, Message)> {
        Some((
            self.id.clone()?,
            Message::Assistant {
                content: Some(self.text.clone()),
                tool_calls: if self.tool_calls.is_empty() {
                    None
                } else {
                    Some(self.tool_calls.clone())
                },
                reasoning_content: self.reasoning.clone(),
            },
        ))
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Assembler, Option<ChatEvent>), Error>;

pin_project! {
    /// A streaming chat-completions response.
    pub struct StreamingCompletion {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
        full_msg: Option<(String, Message)>,
    }
}

impl StreamingCompletion {
    #[inline]
    pub(crate) fn from_sse(reader: SseReader) -> Self {
        let assembler = Assembler::new(reader);
        Self {
            next_event_fut: Some(Box::pin(assembler.advance())),
            full_msg: None,
        }
    }
}

impl ChatResponse for StreamingCompletion {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ChatEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            // Already exhausted.
            return Poll::Ready(Ok(None));
        };
        match ready!(next_event_fut.as_mut().poll(cx)) {
            Ok((assembler, Some(event))) => {
                *this.next_event_fut = Some(Box::pin(assembler.advance()));
                Poll::Ready(Ok(Some(event)))
            }
            Ok((assembler, None)) => {
                *this.next_event_fut = None;
                *this.full_msg = assembler.full_message();
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_event_fut = None;
                Poll::Ready(Err(err))
            }
        }
    }

    fn make_opaque_message(&self) -> Option<OpaqueMessage> {
        self.full_msg
            .as_ref()
            .map(|(id, msg)| OpaqueMessage::new(id, msg.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;

    use super::*;
    use crate::sse::ByteStream;

    fn response_from(chunks: &'static [&'static [u8]]) -> StreamingCompletion {
        let stream = ByteStream::from_chunks(
            chunks.iter().map(|c| Bytes::from_static(c)),
        );
        StreamingCompletion::from_sse(SseReader::new(stream))
    }

    async fn collect(
        resp: &mut Pin<&mut StreamingCompletion>,
    ) -> Vec<ChatEvent> {
        let mut events = vec![];
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await.unwrap()
        {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_text_only_response() {
        let mut resp = pin!(response_from(&[
            b"data: {\"id\":\"c1\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            b"data: {\"id\":\"c1\",\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
            b"data: {\"id\":\"c1\",\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            b"data: [DONE]\n\n",
        ]));
        let events = collect(&mut resp).await;
        assert_eq!(
            events,
            vec![
                ChatEvent::TextDelta("Hello".to_owned()),
                ChatEvent::TextDelta(" there".to_owned()),
                ChatEvent::Completed(FinishReason::Stop),
            ]
        );

        let opaque = resp.make_opaque_message().unwrap();
        let msg: &Message = opaque.to_raw().unwrap();
        let Message::Assistant { content, tool_calls, .. } = msg else {
            panic!("expected an assistant message");
        };
        assert_eq!(content.as_deref(), Some("Hello there"));
        assert!(tool_calls.is_none());
    }

    #[tokio::test]
    async fn test_fragmented_tool_call() {
        let mut resp = pin!(response_from(&[
            b"data: {\"id\":\"c2\",\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_7\",\"type\":\"function\",\"function\":{\"name\":\"list_branches\",\"arguments\":\"{\\\"project\\\":\"}}]}}]}\n\n",
            b"data: {\"id\":\"c2\",\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"\\\"P\\\"}\"}}]}}]}\n\n",
            b"data: {\"id\":\"c2\",\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
            b"data: [DONE]\n\n",
        ]));
        let events = collect(&mut resp).await;
        assert_eq!(events.len(), 2);
        let ChatEvent::ToolCall(req) = &events[0] else {
            panic!("expected a tool call");
        };
        assert_eq!(req.id, "call_7");
        assert_eq!(req.name, "list_branches");
        assert_eq!(req.arguments["project"], "P");
        assert_eq!(
            events[1],
            ChatEvent::Completed(FinishReason::ToolCalls)
        );
    }

    #[tokio::test]
    async fn test_chunk_id_mismatch_is_an_error() {
        let mut resp = pin!(response_from(&[
            b"data: {\"id\":\"c1\",\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n",
            b"data: {\"id\":\"c9\",\"choices\":[{\"delta\":{\"content\":\"y\"}}]}\n\n",
        ]));
        let first = poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await;
        assert!(first.unwrap().is_some());
        let second = poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await;
        assert!(second.is_err());
    }
}
