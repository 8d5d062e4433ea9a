//! YAML-backed model registry
//!
//! The registry file has the shape:
//!
//! ```yaml
//! models:
//!   llama-7b:
//!     model_name: meta-llama/Llama-2-7b-chat-hf
//!     backend_type: openai_compatible
//!     base_url: ${LLAMA_API_URL}
//!     timeout: 120
//! defaults:
//!   max_tokens: 512
//! ```
//!
//! `${VAR}` base URLs are resolved from the environment when the file is loaded.

use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Kind of HTTP backend serving a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// api.openai.com, authenticated with `OPENAI_API_KEY`
    Openai,
    /// Any server speaking the OpenAI chat-completions protocol
    #[default]
    OpenaiCompatible,
}

impl BackendType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Openai => "openai",
            BackendType::OpenaiCompatible => "openai_compatible",
        }
    }
}

/// Configuration of one logical model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name sent to the backend
    pub model_name: String,
    #[serde(default)]
    pub backend_type: BackendType,
    /// Backend base URL, `None` means the provider default
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub supports_streaming: bool,
}

fn default_model_timeout() -> u64 {
    60
}

impl ModelConfig {
    /// Minimal entry for an OpenAI-compatible backend
    pub fn new(model_name: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            model_name: model_name.into(),
            backend_type: BackendType::OpenaiCompatible,
            base_url,
            api_key_env: None,
            timeout: default_model_timeout(),
            display_name: None,
            description: None,
            tier: None,
            max_tokens: None,
            supports_streaming: false,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct RegistryFile {
    #[serde(default)]
    models: HashMap<String, ModelConfig>,
    #[serde(default)]
    defaults: HashMap<String, serde_json::Value>,
}

/// Immutable registry of the models the gateway can serve
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelConfig>,
    defaults: HashMap<String, serde_json::Value>,
}

impl ModelRegistry {
    /// Load the registry from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading model registry from: {:?}", path);

        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GatewayError::Config(format!(
                "Model config file not found: {}: {}",
                path.display(),
                e
            ))
        })?;

        let registry = Self::from_yaml_str(&content)?;
        info!("Loaded {} models", registry.models.len());
        Ok(registry)
    }

    /// Parse the registry from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: RegistryFile = serde_yaml::from_str(content)?;

        let mut models = file.models;
        for (model_id, model) in models.iter_mut() {
            if let Some(base_url) = model.base_url.as_deref() {
                if let Some(resolved) = resolve_env_placeholder(base_url) {
                    debug!("Resolved base_url placeholder for model {}", model_id);
                    model.base_url = Some(resolved);
                }
            }
            if model.model_name.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "Model {} has an empty model_name",
                    model_id
                )));
            }
            if model.timeout == 0 {
                return Err(GatewayError::Config(format!(
                    "Model {} timeout must be greater than 0",
                    model_id
                )));
            }
        }

        Ok(Self {
            models,
            defaults: file.defaults,
        })
    }

    /// Build a registry from already-parsed entries
    pub fn from_models(models: HashMap<String, ModelConfig>) -> Self {
        Self {
            models,
            defaults: HashMap::new(),
        }
    }

    /// Check if a model id is valid
    pub fn is_valid_model(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    /// Get configuration for a specific model
    pub fn get_model(&self, model_id: &str) -> Option<&ModelConfig> {
        self.models.get(model_id)
    }

    /// List all models, sorted by id
    pub fn list_models(&self) -> Vec<(&str, &ModelConfig)> {
        let mut models: Vec<_> = self
            .models
            .iter()
            .map(|(id, config)| (id.as_str(), config))
            .collect();
        models.sort_by(|a, b| a.0.cmp(b.0));
        models
    }

    /// Get a default value from the `defaults` section
    pub fn get_default(&self, key: &str) -> Option<&serde_json::Value> {
        self.defaults.get(key)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// `${VAR}` -> value of VAR (empty when unset); anything else is left alone
fn resolve_env_placeholder(value: &str) -> Option<String> {
    let var = value.strip_prefix("${")?.strip_suffix('}')?;
    Some(std::env::var(var).unwrap_or_default())
}
