//! Utility modules for the batch gateway
//!
//! - **error**: gateway error type and conversions
//! - **logging**: tracing subscriber setup

pub mod error;
pub mod logging;

pub use logging::init_logging;

use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in seconds
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
