//! Model invocation layer
//!
//! The batch subsystem only depends on the [`ModelInvoker`] capability; the
//! concrete HTTP client lives in [`openai_compatible`].

pub mod openai_compatible;
pub mod unified_provider;

pub use openai_compatible::OpenAICompatibleInvoker;
pub use unified_provider::ProviderError;

use crate::core::models::ModelConfig;
use crate::core::types::{ChatMessage, Completion, GenerationParams};
use async_trait::async_trait;

/// Capability to run one chat completion against a model backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Generate a completion for `messages` with the given sampling parameters
    async fn invoke(
        &self,
        model_id: &str,
        model: &ModelConfig,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError>;
}
