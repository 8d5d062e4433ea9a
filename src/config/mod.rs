//! Configuration management for the gateway
//!
//! This module handles loading, validation, and management of all gateway configuration.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{GatewayError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration struct for the gateway
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Gateway configuration
    pub gateway: GatewayConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GatewayError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml_str(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document means "all defaults"
        let gateway: GatewayConfig = if content.trim().is_empty() {
            GatewayConfig::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| GatewayError::Config(format!("Failed to parse config: {}", e)))?
        };

        let config = Self { gateway };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides on top of the current values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Recognised keys: `REDIS_URL`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`,
    /// `REDIS_ENABLED`, `LOG_LEVEL`, `LOG_FORMAT`, `MODELS_CONFIG`,
    /// `BATCH_WORKERS`, `BATCH_POLL_INTERVAL`, `BATCH_RETENTION_SECS`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gateway = &mut self.gateway;

        if let Some(url) = lookup("REDIS_URL") {
            gateway.storage.redis.url = url;
        } else if lookup("REDIS_HOST").is_some()
            || lookup("REDIS_PORT").is_some()
            || lookup("REDIS_DB").is_some()
        {
            let host = lookup("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
            let port = parse_var(&lookup, "REDIS_PORT")?.unwrap_or(6379);
            let db = parse_var(&lookup, "REDIS_DB")?.unwrap_or(0);
            gateway.storage.redis.url = RedisConfig::url_from_parts(&host, port, db);
        }
        if let Some(enabled) = parse_var(&lookup, "REDIS_ENABLED")? {
            gateway.storage.redis.enabled = enabled;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            gateway.logging.level = level.to_lowercase();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            gateway.logging.format = format.parse().map_err(GatewayError::Config)?;
        }

        if let Some(path) = lookup("MODELS_CONFIG") {
            gateway.models.path = PathBuf::from(path);
        }

        if let Some(workers) = parse_var(&lookup, "BATCH_WORKERS")? {
            gateway.batch.worker_count = workers;
        }
        if let Some(interval) = parse_var(&lookup, "BATCH_POLL_INTERVAL")? {
            gateway.batch.poll_interval_secs = interval;
        }
        if let Some(retention) = parse_var(&lookup, "BATCH_RETENTION_SECS")? {
            gateway.batch.retention_secs = retention;
        }

        Ok(())
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.gateway.storage
    }

    /// Get batch configuration
    pub fn batch(&self) -> &BatchConfig {
        &self.gateway.batch
    }

    /// Get model registry location
    pub fn models(&self) -> &ModelsConfig {
        &self.gateway.models
    }

    /// Get logging configuration
    pub fn logging(&self) -> &LoggingConfig {
        &self.gateway.logging
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");
        Validate::validate(&self.gateway).map_err(GatewayError::Config)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.gateway)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| GatewayError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}
