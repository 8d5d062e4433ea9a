//! Batch job subsystem
//!
//! Producers submit jobs through [`BatchService`]; [`BatchWorker`] loops pull
//! them from the queue and run their tasks with [`TaskExecutor`].

mod events;
mod executor;
mod service;
pub mod types;
mod worker;


// Re-export all public types
pub use events::{
    AsyncEventLogger, BATCH_EVENT_TARGET, BatchEvent, BatchEventKind, BatchEventSink,
    NoopEventSink,
};
pub use executor::{ExecutorConfig, TaskExecutor};
pub use service::BatchService;
pub use types::{
    BatchSubmission, Job, JobMetadata, JobStatus, SubmittedJob, Task, TaskResult,
    generate_job_id,
};
pub use worker::{BatchWorker, SkipReason, WorkerConfig, WorkerTick, spawn_workers};
