//! Common test utilities for llm-batch-gateway
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::{fixtures, providers::ScriptedInvoker};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let harness = fixtures::TestHarness::new(ScriptedInvoker::new());
//!     // ...
//! }
//! ```

pub mod assertions;
pub mod events;
pub mod fixtures;
pub mod providers;

// Re-export commonly used items
pub use events::CapturingEventSink;
pub use fixtures::{TestHarness, TaskFactory};
pub use providers::ScriptedInvoker;

/// Skip test if environment variable is not set
#[macro_export]
macro_rules! skip_without_env {
    ($var:expr) => {
        if std::env::var($var).is_err() {
            eprintln!("Skipping test: {} environment variable not set", $var);
            return;
        }
    };
}
