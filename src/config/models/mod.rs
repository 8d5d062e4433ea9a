//! Configuration data models
//!
//! This module defines all configuration structures used throughout the gateway.

#![allow(missing_docs)]

pub mod batch;
pub mod gateway;
pub mod logging;
pub mod storage;

// Re-export all configuration types
pub use batch::*;
pub use gateway::*;
pub use logging::*;
pub use storage::*;

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default job retention (24 hours)
pub fn default_retention_secs() -> u64 {
    86_400
}

/// Default worker poll interval in seconds
pub fn default_poll_interval_secs() -> u64 {
    5
}

pub fn default_worker_count() -> usize {
    1
}

pub fn default_task_concurrency() -> usize {
    1
}

pub fn default_lease_ttl_secs() -> u64 {
    300
}

pub fn default_event_buffer_size() -> usize {
    1024
}

pub fn default_max_tokens() -> u32 {
    512
}

pub fn default_temperature() -> f32 {
    0.7
}

pub fn default_top_p() -> f32 {
    0.95
}

pub fn default_true() -> bool {
    true
}
