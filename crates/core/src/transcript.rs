//! The conversation transcript and its eviction policy.

use devops_copilot_model::{ChatMessage, ToolReply};

/// How many non-system entries the transcript may hold before eviction.
const MAX_ENTRIES: usize = 20;
/// How many of the oldest entries one eviction removes.
const EVICTION_BATCH: usize = 4;

/// The ordered conversation history.
///
/// A fixed system message sits outside the entry list and is never evicted.
/// Everything else is appended in arrival order and trimmed with a
/// fixed-size sliding window: once the list exceeds [`MAX_ENTRIES`], the
/// oldest [`EVICTION_BATCH`] entries are dropped. No summarization happens,
/// the context is simply bounded.
#[derive(Clone, Debug)]
pub struct Transcript {
    system: ChatMessage,
    entries: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates a transcript with the given system prompt.
    pub fn with_system_prompt<S: Into<String>>(prompt: S) -> Self {
        Self {
            system: ChatMessage::System(prompt.into()),
            entries: Vec::new(),
        }
    }

    /// Appends a line of user input.
    #[inline]
    pub fn push_user<S: Into<String>>(&mut self, input: S) {
        self.entries.push(ChatMessage::User(input.into()));
    }

    /// Appends an assistant (or provider-opaque) message.
    #[inline]
    pub fn push_message(&mut self, msg: ChatMessage) {
        self.entries.push(msg);
    }

    /// Appends the result of a tool invocation.
    #[inline]
    pub fn push_tool_reply(&mut self, reply: ToolReply) {
        self.entries.push(ChatMessage::Tool(reply));
    }

    /// Applies the sliding-window policy once.
    ///
    /// Returns how many entries were evicted (0 or [`EVICTION_BATCH`]).
    pub fn trim(&mut self) -> usize {
        if self.entries.len() <= MAX_ENTRIES {
            return 0;
        }
        self.entries.drain(..EVICTION_BATCH);
        EVICTION_BATCH
    }

    /// Returns the number of non-system entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript holds no non-system entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The non-system entries, oldest first.
    #[inline]
    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Builds the full message sequence for a completion request, the
    /// system message first.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.entries.len() + 1);
        messages.push(self.system.clone());
        messages.extend(self.entries.iter().cloned());
        messages
    }
}
