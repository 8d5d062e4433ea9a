//! Batch service: submission, lookup and lifecycle transitions
//!
//! The service owns the record-level rules. Every update reads the current
//! record, applies one forward-only transition and writes the whole record
//! back, so readers never observe a half-updated job.

use super::events::{BatchEvent, BatchEventSink};
use super::types::{BatchSubmission, Job, JobMetadata, SubmittedJob, Task, TaskResult};
use crate::config::BatchConfig;
use crate::core::models::ModelRegistry;
use crate::storage::{BatchStorage, StorageMode};
use crate::utils::current_timestamp;
use crate::utils::error::{GatewayError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Entry point for producers and workers
pub struct BatchService {
    storage: BatchStorage,
    registry: Arc<ModelRegistry>,
    config: BatchConfig,
    events: Arc<dyn BatchEventSink>,
}

impl BatchService {
    pub fn new(
        storage: BatchStorage,
        registry: Arc<ModelRegistry>,
        config: BatchConfig,
        events: Arc<dyn BatchEventSink>,
    ) -> Self {
        Self {
            storage,
            registry,
            config,
            events,
        }
    }

    /// Validate, persist and enqueue a new job
    pub async fn submit(&self, submission: BatchSubmission) -> Result<SubmittedJob> {
        if !self.registry.is_valid_model(&submission.model_id) {
            return Err(GatewayError::unknown_model(&submission.model_id));
        }

        let params = submission.params_or(self.config.default_params());
        params.validate().map_err(GatewayError::validation)?;
        validate_task_ids(&submission.tasks)?;

        let job = Job::new(
            submission.model_id,
            submission.tasks,
            params,
            submission.metadata.unwrap_or_default(),
            current_timestamp(),
        );

        self.storage.store().put(&job).await?;
        if let Err(e) = self.storage.queue().enqueue(&job.job_id).await {
            error!(job_id = %job.job_id, "Job stored but could not be queued: {}", e);
            return Err(e);
        }

        info!(
            job_id = %job.job_id,
            model = %job.model_id,
            tasks = job.task_count,
            "Batch job submitted"
        );
        self.events.record(BatchEvent::submitted(&job));

        Ok(SubmittedJob::from(&job))
    }

    /// Positional form of [`submit`](Self::submit) returning only the job id
    pub async fn submit_batch_job(
        &self,
        model_id: &str,
        tasks: Vec<Task>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        top_p: Option<f32>,
        metadata: Option<JobMetadata>,
    ) -> Result<String> {
        let submission = BatchSubmission {
            model_id: model_id.to_string(),
            tasks,
            max_tokens,
            temperature,
            top_p,
            metadata,
        };
        Ok(self.submit(submission).await?.job_id)
    }

    /// Current snapshot of a job; `None` for unknown or expired ids
    pub async fn status(&self, job_id: &str) -> Result<Option<Job>> {
        self.storage.store().get(job_id).await
    }

    pub async fn get_job_status(&self, job_id: &str) -> Result<Option<Job>> {
        self.status(job_id).await
    }

    /// queued -> processing
    pub async fn mark_processing(&self, job_id: &str) -> Result<Option<Job>> {
        self.update(job_id, |job, now| job.mark_processing(now)).await
    }

    /// processing -> completed
    pub async fn complete(&self, job_id: &str, results: Vec<TaskResult>) -> Result<Option<Job>> {
        self.update(job_id, move |job, now| job.complete(results, now)).await
    }

    /// processing -> failed
    pub async fn fail(&self, job_id: &str, error: &str) -> Result<Option<Job>> {
        self.update(job_id, |job, now| job.fail(error, now)).await
    }

    /// Pop the next pending job id
    pub async fn next_job(&self) -> Result<Option<String>> {
        self.storage.queue().dequeue().await
    }

    /// Put a dequeued id back at the tail of the queue
    pub async fn requeue(&self, job_id: &str) -> Result<()> {
        self.storage.queue().enqueue(job_id).await
    }

    /// Claim a job for `owner` for the configured lease TTL
    pub async fn claim(&self, job_id: &str, owner: &str) -> Result<bool> {
        self.storage
            .store()
            .try_claim(job_id, owner, self.config.lease_ttl())
            .await
    }

    pub async fn release(&self, job_id: &str, owner: &str) -> Result<()> {
        self.storage.store().release_claim(job_id, owner).await
    }

    /// Number of jobs waiting in the queue
    pub async fn pending_jobs(&self) -> Result<usize> {
        self.storage.queue().len().await
    }

    pub async fn health_check(&self) -> Result<()> {
        self.storage.store().health_check().await
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage.mode()
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    async fn update<F>(&self, job_id: &str, transition: F) -> Result<Option<Job>>
    where
        F: FnOnce(&mut Job, i64) -> Result<()>,
    {
        let Some(mut job) = self.storage.store().get(job_id).await? else {
            debug!(job_id, "Update skipped, job not found");
            return Ok(None);
        };

        transition(&mut job, current_timestamp())?;
        self.storage.store().put(&job).await?;
        debug!(job_id, status = %job.status, "Job updated");
        Ok(Some(job))
    }
}

fn validate_task_ids(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in tasks {
        if task.id.is_empty() {
            return Err(GatewayError::validation("task id must not be empty"));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(GatewayError::validation(format!(
                "duplicate task id: {}",
                task.id
            )));
        }
    }
    Ok(())
}
