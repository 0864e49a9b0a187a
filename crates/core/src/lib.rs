//! Core logic: the chat orchestrator, the transcript, and tool execution.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod agent;
mod chat_client;
pub mod tool;
pub mod transcript;

pub use agent::{Agent, AgentBuilder, TurnError};
pub use chat_client::{ChatClient, ChatOutcome};
