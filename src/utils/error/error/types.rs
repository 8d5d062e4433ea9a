//! Error types for the batch gateway

use crate::core::providers::unified_provider::ProviderError;
use thiserror::Error;

/// Result type alias for the gateway
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Redis errors
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model backend errors
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Model id not present in the registry
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Illegal job state transition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Job store or queue unavailable
    #[error("Storage error: {0}")]
    Storage(String),

    /// Every task of a job timed out
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
