//! OpenAI-compatible chat completion client
//!
//! Works against api.openai.com as well as self-hosted servers (vLLM, TGI,
//! llama.cpp) exposing `/chat/completions`.

use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::ModelInvoker;
use super::unified_provider::ProviderError;
use crate::core::models::{BackendType, ModelConfig};
use crate::core::types::{ChatMessage, Completion, GenerationParams, Usage};

/// Default API base for `backend_type: openai`
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

const PLACEHOLDER_API_KEY: &str = "dummy-key";
const POOL_KEEPALIVE_SECS: u64 = 90;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ResponseChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ResponseChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP invoker with one pooled client per model id
#[derive(Debug, Default)]
pub struct OpenAICompatibleInvoker {
    clients: DashMap<String, Client>,
}

impl OpenAICompatibleInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the client for a model; the timeout is per model
    fn client_for(&self, model_id: &str, model: &ModelConfig) -> Result<Client, ProviderError> {
        let provider = model.backend_type.as_str();
        let client = self
            .clients
            .entry(model_id.to_string())
            .or_try_insert_with(|| {
                Client::builder()
                    .timeout(Duration::from_secs(model.timeout))
                    .pool_idle_timeout(Duration::from_secs(POOL_KEEPALIVE_SECS))
                    .build()
                    .map_err(|e| ProviderError::configuration(provider, e.to_string()))
            })?;
        Ok(client.value().clone())
    }

    fn api_key(model: &ModelConfig) -> String {
        let from_env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        if let Some(key) = model.api_key_env.as_deref().and_then(from_env) {
            return key;
        }
        match model.backend_type {
            BackendType::Openai => {
                from_env("OPENAI_API_KEY").unwrap_or_else(|| PLACEHOLDER_API_KEY.to_string())
            }
            BackendType::OpenaiCompatible => PLACEHOLDER_API_KEY.to_string(),
        }
    }

    fn endpoint(model: &ModelConfig) -> String {
        let base = model
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(OPENAI_API_BASE);
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

fn map_send_error(provider: &'static str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(provider, err.to_string())
    } else {
        ProviderError::network(provider, err.to_string())
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.chars().take(512).collect())
}

#[async_trait]
impl ModelInvoker for OpenAICompatibleInvoker {
    async fn invoke(
        &self,
        model_id: &str,
        model: &ModelConfig,
        messages: &[ChatMessage],
        params: &GenerationParams,
    ) -> Result<Completion, ProviderError> {
        let provider = model.backend_type.as_str();
        let client = self.client_for(model_id, model)?;
        let url = Self::endpoint(model);

        let body = serde_json::json!({
            "model": model.model_name,
            "messages": messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "stream": false,
        });

        debug!("Calling {} for model {}", url, model_id);
        let response = client
            .post(&url)
            .bearer_auth(Self::api_key(model))
            .json(&body)
            .send()
            .await
            .map_err(|e| map_send_error(provider, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_status(
                provider,
                status.as_u16(),
                error_message(&text),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::response_parsing(provider, e.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            ProviderError::response_parsing(provider, "response contained no choices")
        })?;

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            usage: parsed.usage.unwrap_or_default(),
        })
    }
}
