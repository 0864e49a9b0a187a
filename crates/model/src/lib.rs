//! An abstraction layer for hosted chat-completion services.
//!
//! The orchestrator only configures the completion service: it supplies the
//! transcript and the registered tool descriptors, and consumes a lazy
//! sequence of text fragments plus tool-invocation requests. This crate
//! defines that contract so providers can be swapped without touching the
//! agent loop.
//!
//! Types here carry no behavior of their own; they are the constraints a
//! provider implementation must adhere to.

#![deny(missing_docs)]

mod error;
mod opaque;
mod provider;
mod request;
mod response;

pub use error::*;
pub use opaque::*;
pub use provider::*;
pub use request::*;
pub use response::*;
