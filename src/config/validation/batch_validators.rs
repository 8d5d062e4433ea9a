//! Batch, logging and gateway-level validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

const MAX_WORKERS: usize = 64;

impl Validate for BatchConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating batch configuration");

        if self.retention_secs == 0 {
            return Err("Batch retention must be greater than 0".to_string());
        }

        if self.poll_interval_secs == 0 {
            return Err("Batch poll interval must be greater than 0".to_string());
        }

        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(format!(
                "Batch worker count must be between 1 and {}",
                MAX_WORKERS
            ));
        }

        if self.task_concurrency == 0 {
            return Err("Batch task concurrency must be at least 1".to_string());
        }

        if self.lease_ttl_secs == 0 {
            return Err("Batch lease TTL must be greater than 0".to_string());
        }

        if self.job_key_prefix.is_empty()
            || self.queue_key.is_empty()
            || self.lease_key_prefix.is_empty()
        {
            return Err("Batch key names cannot be empty".to_string());
        }

        if self.event_buffer_size == 0 {
            return Err("Batch event buffer size must be greater than 0".to_string());
        }

        self.default_params()
            .validate()
            .map_err(|e| format!("Invalid default generation parameters: {}", e))
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for ModelsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("Model registry path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Validate for GatewayConfig {
    fn validate(&self) -> Result<(), String> {
        self.storage
            .validate()
            .map_err(|e| format!("Storage config error: {}", e))?;
        self.batch
            .validate()
            .map_err(|e| format!("Batch config error: {}", e))?;
        self.models
            .validate()
            .map_err(|e| format!("Models config error: {}", e))?;
        self.logging
            .validate()
            .map_err(|e| format!("Logging config error: {}", e))
    }
}
