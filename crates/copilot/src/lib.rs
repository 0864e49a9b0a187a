//! A conversational copilot for managing an Azure DevOps organization.
//!
//! The binary wires an OpenAI-compatible completion service to a set of
//! Azure DevOps tools and runs a console chat loop. The pieces are also
//! usable as a library: build a [`DevOpsClient`], hand it with a chat
//! provider to a [`SessionBuilder`], and drive the returned [`Session`]
//! turn by turn.

#[macro_use]
extern crate tracing;

mod config;
mod devops;
mod session;

pub mod tools;

pub use config::{Config, ConfigError};
pub use devops::{ClientError, DevOpsClient, DevOpsEndpoints};
pub use session::{Session, SessionBuilder};
