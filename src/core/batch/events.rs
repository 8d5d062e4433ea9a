//! Batch lifecycle events
//!
//! Workers and the service report `submitted`, `started`, `completed` and
//! `failed` through a [`BatchEventSink`]. Recording never fails and never
//! blocks the caller.

use super::types::{Job, JobMetadata, JobStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Tracing target used for emitted events
pub const BATCH_EVENT_TARGET: &str = "batch_events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchEventKind {
    Submitted,
    Started,
    Completed,
    Failed,
}

impl BatchEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchEventKind::Submitted => "submitted",
            BatchEventKind::Started => "started",
            BatchEventKind::Completed => "completed",
            BatchEventKind::Failed => "failed",
        }
    }
}

/// One lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEvent {
    pub job_id: String,
    pub event: BatchEventKind,
    pub model: String,
    pub task_count: usize,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JobMetadata>,
    pub timestamp: DateTime<Utc>,
}

impl BatchEvent {
    fn from_job(job: &Job, event: BatchEventKind) -> Self {
        Self {
            job_id: job.job_id.clone(),
            event,
            model: job.model_id.clone(),
            task_count: job.task_count,
            status: job.status,
            completed_count: None,
            failed_count: None,
            error: None,
            metadata: (!job.metadata.is_empty()).then(|| job.metadata.clone()),
            timestamp: Utc::now(),
        }
    }

    pub fn submitted(job: &Job) -> Self {
        Self::from_job(job, BatchEventKind::Submitted)
    }

    pub fn started(job: &Job) -> Self {
        Self::from_job(job, BatchEventKind::Started)
    }

    pub fn completed(job: &Job) -> Self {
        let mut event = Self::from_job(job, BatchEventKind::Completed);
        event.completed_count = Some(job.completed_count);
        event.failed_count = Some(job.failed_count);
        event
    }

    pub fn failed(job: &Job) -> Self {
        let mut event = Self::from_job(job, BatchEventKind::Failed);
        event.error = job.error.clone();
        event
    }
}

/// Receiver of batch lifecycle events
pub trait BatchEventSink: Send + Sync {
    fn record(&self, event: BatchEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl BatchEventSink for NoopEventSink {
    fn record(&self, _event: BatchEvent) {}
}

/// Emits events as structured tracing records from a background task
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct AsyncEventLogger {
    sender: mpsc::Sender<BatchEvent>,
    drop_on_overflow: bool,
}

impl AsyncEventLogger {
    /// Bounded channel of `buffer_size` events
    pub fn new(buffer_size: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<BatchEvent>(buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                Self::emit(&event);
            }
        });

        Self {
            sender,
            drop_on_overflow: false,
        }
    }

    /// Drop overflowing events without a warning
    pub fn with_drop_on_overflow(mut self, drop_on_overflow: bool) -> Self {
        self.drop_on_overflow = drop_on_overflow;
        self
    }

    fn emit(event: &BatchEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => info!(
                target: BATCH_EVENT_TARGET,
                job_id = %event.job_id,
                event = event.event.as_str(),
                "{}",
                payload
            ),
            Err(e) => warn!("Failed to serialize batch event for {}: {}", event.job_id, e),
        }
    }
}

impl BatchEventSink for AsyncEventLogger {
    fn record(&self, event: BatchEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                if !self.drop_on_overflow {
                    warn!(
                        "Batch event buffer full, {} event for {} dropped",
                        event.event.as_str(),
                        event.job_id
                    );
                }
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!("Batch event channel closed");
            }
        }
    }
}
