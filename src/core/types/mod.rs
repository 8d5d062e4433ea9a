//! Shared request/response types for model invocation
//!
//! These types are used both by the batch subsystem and by the model
//! invocation layer.

pub mod message;
pub mod requests;
pub mod responses;

pub use message::{ChatMessage, MessageRole};
pub use requests::GenerationParams;
pub use responses::{Completion, Usage};
