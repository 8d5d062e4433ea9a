//! # llm-batch-gateway
//!
//! Batch job subsystem of an LLM gateway. Callers submit a job of independent
//! chat-completion tasks against one registered model and receive a job id;
//! worker loops pull jobs from a queue, run every task and record the
//! per-task results, which callers poll for.
//!
//! ## Features
//!
//! - **Durable or in-process storage**: Redis when reachable, an in-memory
//!   fallback otherwise
//! - **Forward-only job state machine**: `queued -> processing -> completed | failed`
//! - **Task isolation**: one failing task never fails its siblings
//! - **Replicated workers**: claims keep two workers off the same job
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llm_batch_gateway::core::batch::{BatchSubmission, Task};
//! use llm_batch_gateway::core::models::ModelRegistry;
//! use llm_batch_gateway::core::types::ChatMessage;
//! use llm_batch_gateway::runtime::{BatchRuntime, load_config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config(None).await?;
//!     let registry = ModelRegistry::from_file(&config.models().path).await?;
//!     let runtime = BatchRuntime::connect(config, registry).await;
//!
//!     let submitted = runtime
//!         .service()
//!         .submit(BatchSubmission::new(
//!             "llama-7b",
//!             vec![Task::new("q1", vec![ChatMessage::user("Hello!")])],
//!         ))
//!         .await?;
//!     println!("queued {}", submitted.job_id);
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod runtime;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::batch::{
    BatchService, BatchSubmission, BatchWorker, Job, JobStatus, Task, TaskExecutor, TaskResult,
};
pub use core::models::{ModelConfig, ModelRegistry};
pub use core::providers::{ModelInvoker, ProviderError};
pub use storage::{BatchStorage, JobQueue, JobStore, StorageMode};
pub use utils::error::{GatewayError, Result};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Gateway build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    /// Version number
    pub version: &'static str,
    /// Build timestamp, unix seconds
    pub build_time: &'static str,
    /// Git commit hash
    pub git_hash: &'static str,
    /// Rust version
    pub rust_version: &'static str,
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self {
            version: VERSION,
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown"),
            git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
            rust_version: option_env!("RUST_VERSION").unwrap_or("unknown"),
        }
    }
}

/// Build information captured by the build script
pub fn build_info() -> BuildInfo {
    BuildInfo::default()
}
