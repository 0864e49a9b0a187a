//! A chat provider for OpenAI-compatible completion APIs.

#[macro_use]
extern crate tracing;

mod config;
mod proto;
mod response;
mod sse;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use devops_copilot_model::{
    ChatProvider, ChatProviderError, ChatRequest, ErrorKind,
};
use mime::Mime;
use reqwest::{Client, Response, header};

pub use config::{CompletionConfig, CompletionConfigBuilder};
pub use response::StreamingCompletion;
use sse::{ByteStream, SseReader};

/// Error type for [`OpenAIChatProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

/// OpenAI-compatible chat-completion provider.
#[derive(Clone, Debug)]
pub struct OpenAIChatProvider {
    client: Client,
    config: Arc<CompletionConfig>,
}

impl OpenAIChatProvider {
    /// Creates a new provider with the given configuration.
    #[inline]
    pub fn new(config: CompletionConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }
}

impl ChatProvider for OpenAIChatProvider {
    type Error = Error;
    type Response = StreamingCompletion;

    fn submit(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static
    {
        let wire_req = proto::encode_request(req, &self.config);
        let resp_fut = self
            .client
            .post(format!("{}{}", self.config.endpoint, "/chat/completions"))
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "text/event-stream")
            .json(&wire_req)
            .send();

        async move {
            let resp = match resp_fut.await.and_then(Response::error_for_status)
            {
                Ok(resp) => resp,
                Err(err) => {
                    return Err(Error::new(format!("{err}"), ErrorKind::Other));
                }
            };

            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let is_event_stream = content_type
                .and_then(|v| v.parse::<Mime>().ok())
                .map(|m| {
                    m.type_() == mime::TEXT && m.subtype() == "event-stream"
                })
                .unwrap_or(false);
            if !is_event_stream {
                return Err(Error::new(
                    format!("unexpected content type: {content_type:?}"),
                    ErrorKind::Other,
                ));
            }

            let reader = SseReader::new(ByteStream::from_response(resp));
            Ok(StreamingCompletion::from_sse(reader))
        }
    }
}
