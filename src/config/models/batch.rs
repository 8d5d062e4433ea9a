//! Batch subsystem configuration

use super::*;
use crate::core::types::GenerationParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Batch job configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// How long a job record is kept after its last write, in seconds
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// Worker backoff when the queue is empty or an iteration failed, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Number of worker loops started by the gateway process
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// Tasks of one job run concurrently up to this limit (1 = sequential)
    #[serde(default = "default_task_concurrency")]
    pub task_concurrency: usize,
    /// Lifetime of a worker's claim on a job, in seconds
    #[serde(default = "default_lease_ttl_secs")]
    pub lease_ttl_secs: u64,
    /// Key prefix for job records
    #[serde(default = "default_job_key_prefix")]
    pub job_key_prefix: String,
    /// Key of the pending job list
    #[serde(default = "default_queue_key")]
    pub queue_key: String,
    /// Key prefix for job claims
    #[serde(default = "default_lease_key_prefix")]
    pub lease_key_prefix: String,
    /// Capacity of the batch event channel
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
    /// Defaults applied when a submission omits generation parameters
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,
    #[serde(default = "default_top_p")]
    pub default_top_p: f32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            worker_count: default_worker_count(),
            task_concurrency: default_task_concurrency(),
            lease_ttl_secs: default_lease_ttl_secs(),
            job_key_prefix: default_job_key_prefix(),
            queue_key: default_queue_key(),
            lease_key_prefix: default_lease_key_prefix(),
            event_buffer_size: default_event_buffer_size(),
            default_max_tokens: default_max_tokens(),
            default_temperature: default_temperature(),
            default_top_p: default_top_p(),
        }
    }
}

impl BatchConfig {
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn lease_ttl(&self) -> Duration {
        Duration::from_secs(self.lease_ttl_secs)
    }

    /// Generation parameters used when the caller leaves them unset
    pub fn default_params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.default_max_tokens,
            temperature: self.default_temperature,
            top_p: self.default_top_p,
        }
    }
}

fn default_job_key_prefix() -> String {
    "job:".to_string()
}

fn default_queue_key() -> String {
    "batch_queue".to_string()
}

fn default_lease_key_prefix() -> String {
    "batch_lease:".to_string()
}
