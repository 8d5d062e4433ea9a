//! Main gateway configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GatewayConfig {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Batch subsystem configuration
    #[serde(default)]
    pub batch: BatchConfig,
    /// Model registry location
    #[serde(default)]
    pub models: ModelsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the model registry lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsConfig {
    #[serde(default = "default_models_path")]
    pub path: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            path: default_models_path(),
        }
    }
}

fn default_models_path() -> PathBuf {
    PathBuf::from("config/models.yaml")
}
