//! Scripted model invoker
//!
//! Answers from the last message of each task, so tests steer outcomes
//! through prompt text:
//! - contains `fail` -> backend API error for that task
//! - contains `unreachable` -> network error
//! - contains `slow` -> answers after `slow_delay`
//! - anything else -> `echo: <prompt>` with usage derived from the prompt length

use async_trait::async_trait;
use llm_batch_gateway::core::models::ModelConfig;
use llm_batch_gateway::core::providers::{ModelInvoker, ProviderError};
use llm_batch_gateway::core::types::{ChatMessage, Completion, GenerationParams, Usage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const PROVIDER: &str = "scripted";

#[derive(Debug)]
pub struct ScriptedInvoker {
    slow_delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for ScriptedInvoker {
    fn default() -> Self {
        Self {
            slow_delay: Duration::from_millis(50),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_delay(mut self, delay: Duration) -> Self {
        self.slow_delay = delay;
        self
    }

    /// Total invocations so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent invocations observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(
        &self,
        _model_id: &str,
        _model: &ModelConfig,
        messages: &[ChatMessage],
        _params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        if prompt.contains("slow") {
            tokio::time::sleep(self.slow_delay).await;
        }

        let outcome = if prompt.contains("unreachable") {
            Err(ProviderError::network(PROVIDER, "connection refused"))
        } else if prompt.contains("fail") {
            Err(ProviderError::api_error(PROVIDER, 500, format!("cannot answer '{}'", prompt)))
        } else {
            let prompt_tokens = prompt.split_whitespace().count() as u32;
            Ok(Completion::new(
                format!("echo: {}", prompt),
                Usage::new(prompt_tokens, prompt_tokens + 1),
            ))
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}
