//! Batch job types and the job state machine

use crate::core::types::{ChatMessage, Completion, GenerationParams, Usage};
use crate::utils::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Opaque caller-supplied metadata, echoed back but never interpreted
pub type JobMetadata = HashMap<String, serde_json::Value>;

/// Batch job status
///
/// Transitions only move forward: `queued -> processing -> completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in the queue
    Queued,
    /// Picked up by a worker
    Processing,
    /// Every task ran; individual tasks may still carry errors
    Completed,
    /// The job as a whole could not be executed
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generation request within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Caller-supplied id, unique within the job
    pub id: String,
    pub messages: Vec<ChatMessage>,
}

impl Task {
    pub fn new(id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            id: id.into(),
            messages,
        }
    }
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: String,
    /// Generated text, empty on failure
    pub output: String,
    /// Token usage, zero-filled on failure
    pub usage: Usage,
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(id: impl Into<String>, completion: Completion) -> Self {
        Self {
            id: id.into(),
            output: completion.text,
            usage: completion.usage,
            error: None,
        }
    }

    pub fn failure(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: String::new(),
            usage: Usage::default(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Persisted batch job record
///
/// A record is always written as a whole; readers see either the previous or
/// the next snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub model_id: String,
    pub tasks: Vec<Task>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    #[serde(default)]
    pub metadata: JobMetadata,
    /// Unix seconds
    pub submitted_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub task_count: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub results: Option<Vec<TaskResult>>,
    pub error: Option<String>,
}

impl Job {
    /// Create a queued job
    pub fn new(
        model_id: impl Into<String>,
        tasks: Vec<Task>,
        params: GenerationParams,
        metadata: JobMetadata,
        submitted_at: i64,
    ) -> Self {
        let task_count = tasks.len();
        Self {
            job_id: generate_job_id(),
            status: JobStatus::Queued,
            model_id: model_id.into(),
            tasks,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            metadata,
            submitted_at,
            started_at: None,
            completed_at: None,
            task_count,
            completed_count: 0,
            failed_count: 0,
            results: None,
            error: None,
        }
    }

    /// Generation parameters shared by every task of the job
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    /// queued -> processing
    ///
    /// Repeating the call on a processing job is accepted and keeps the
    /// original `started_at`.
    pub fn mark_processing(&mut self, now: i64) -> Result<()> {
        match self.status {
            JobStatus::Queued | JobStatus::Processing => {
                self.status = JobStatus::Processing;
                self.started_at.get_or_insert(now);
                Ok(())
            }
            status => Err(self.illegal_transition(status, JobStatus::Processing)),
        }
    }

    /// processing -> completed, deriving the counters from `results`
    pub fn complete(&mut self, results: Vec<TaskResult>, now: i64) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(self.illegal_transition(self.status, JobStatus::Completed));
        }
        if results.len() != self.task_count {
            return Err(GatewayError::internal(format!(
                "job {} expects {} results, got {}",
                self.job_id,
                self.task_count,
                results.len()
            )));
        }

        self.failed_count = results.iter().filter(|r| r.is_error()).count();
        self.completed_count = results.len() - self.failed_count;
        self.results = Some(results);
        self.status = JobStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// processing -> failed; `results` stays empty
    pub fn fail(&mut self, error: impl Into<String>, now: i64) -> Result<()> {
        if self.status != JobStatus::Processing {
            return Err(self.illegal_transition(self.status, JobStatus::Failed));
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(now);
        Ok(())
    }

    fn illegal_transition(&self, from: JobStatus, to: JobStatus) -> GatewayError {
        GatewayError::conflict(format!(
            "job {} cannot move from {} to {}",
            self.job_id, from, to
        ))
    }
}

/// Opaque job id: `batch-` followed by 12 hex characters
pub fn generate_job_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("batch-{}", &hex[..12])
}

/// Batch submission as received from the API layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSubmission {
    #[serde(alias = "model")]
    pub model_id: String,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default, alias = "batch_metadata")]
    pub metadata: Option<JobMetadata>,
}

impl BatchSubmission {
    pub fn new(model_id: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            model_id: model_id.into(),
            tasks,
            max_tokens: None,
            temperature: None,
            top_p: None,
            metadata: None,
        }
    }

    /// Fill unset parameters from `defaults`
    pub fn params_or(&self, defaults: GenerationParams) -> GenerationParams {
        GenerationParams {
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
        }
    }
}

/// Acknowledgement returned by a successful submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub job_id: String,
    pub status: JobStatus,
    pub submitted_at: i64,
    pub task_count: usize,
    pub metadata: JobMetadata,
}

impl From<&Job> for SubmittedJob {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.job_id.clone(),
            status: job.status,
            submitted_at: job.submitted_at,
            task_count: job.task_count,
            metadata: job.metadata.clone(),
        }
    }
}
