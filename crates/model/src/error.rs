/// The kind of error a provider produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The content was rejected by a moderation layer.
    Moderated,
    /// The provider is rate limited.
    RateLimitExceeded,
    /// Any other errors.
    Other,
}
