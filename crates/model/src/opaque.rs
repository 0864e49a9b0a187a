use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A message from the model that the orchestrator stores but never inspects.
///
/// The transcript types this crate defines may lose context for the model.
/// For example, a chat-completions provider needs the complete assistant
/// message (tool calls included) replayed verbatim in later requests. An
/// `OpaqueMessage` lets the provider stash that raw structure in the
/// transcript and get it back when the next request is built.
pub struct OpaqueMessage {
    id: Arc<str>,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueMessage {
    /// Creates a new `OpaqueMessage`.
    ///
    /// The `id` identifies the message and should be unique across the
    /// conversation; equality and hashing only consider the `id`.
    #[inline]
    pub fn new<ID: Into<String>, T: Send + Sync + 'static>(
        id: ID,
        value: T,
    ) -> Self {
        Self {
            id: id.into().into(),
            value: Arc::new(value),
        }
    }

    /// Borrows the raw value, if `T` is the type it was created with.
    #[inline]
    pub fn to_raw<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }
}

impl Clone for OpaqueMessage {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            value: Arc::clone(&self.value),
        }
    }
}

impl Debug for OpaqueMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpaqueMessage").field("id", &self.id).finish()
    }
}

impl PartialEq for OpaqueMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueMessage {}

impl Hash for OpaqueMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
