use std::fmt::Debug;

/// Builder for [`CompletionConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompletionConfigBuilder {
    api_key: String,
    model: Option<String>,
    endpoint: Option<String>,
}

impl CompletionConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            endpoint: None,
        }
    }

    /// Sets the model (deployment) name to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the service endpoint, without the `/chat/completions` suffix.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> CompletionConfig {
        CompletionConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| "gpt-4o".to_string()),
            endpoint: self
                .endpoint
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }
}

impl Debug for CompletionConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfigBuilder")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Configuration for the OpenAI-compatible completion provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompletionConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) endpoint: String,
}

impl Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
