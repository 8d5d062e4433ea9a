//! Storage configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageConfig {
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedisConfig {
    /// Redis URL
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Enable Redis (if false, batch state is kept in-process)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            enabled: true,
            connection_timeout: default_connection_timeout(),
        }
    }
}

impl RedisConfig {
    /// Build a URL from the host/port/db triple used by older deployments
    pub fn url_from_parts(host: &str, port: u16, db: u32) -> String {
        format!("redis://{}:{}/{}", host, port, db)
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379/0".to_string()
}
