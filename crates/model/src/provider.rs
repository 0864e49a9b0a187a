use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ChatRequest;
use crate::response::ChatResponse;

/// The error type for a chat provider.
pub trait ChatProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A hosted chat-completion service.
///
/// Once created, a provider should behave like a stateless object. It can
/// keep internal state (connection pools, etc.), but callers should not rely
/// on it, and the provider must be prepared for being dropped anytime.
pub trait ChatProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ChatProviderError;

    /// The streaming response type for this provider.
    type Response: ChatResponse<Error = Self::Error>;

    /// Submits a request to the service.
    fn submit(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send + 'static;
}
