//! Worker loop
//!
//! Each worker drains the queue one job at a time. Errors inside an
//! iteration are logged and followed by the poll backoff; the loop only
//! exits on shutdown. A popped job id is never dropped because of a store
//! outage: it is either requeued or carried through to a terminal state.

use super::events::{BatchEvent, BatchEventSink};
use super::executor::TaskExecutor;
use super::service::BatchService;
use super::types::{Job, JobStatus};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Worker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Owner name used for job claims and in logs
    pub worker_id: String,
    /// Backoff after an empty queue or a failed iteration
    pub poll_interval: Duration,
}

impl WorkerConfig {
    pub fn new(worker_id: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            worker_id: worker_id.into(),
            poll_interval,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self::new(format!("worker-{}", &suffix[..8]), Duration::from_secs(5))
    }
}

/// Why a dequeued job was not processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Another worker holds the claim
    Claimed,
    /// Record expired or never existed
    Missing,
    /// Already completed or failed
    Finished(JobStatus),
}

/// Outcome of one loop iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerTick {
    /// Queue was empty
    Idle,
    Processed { job_id: String, status: JobStatus },
    Skipped { job_id: String, reason: SkipReason },
}

enum Start {
    Ready(Job),
    Skip(SkipReason),
}

/// Single batch worker
pub struct BatchWorker {
    service: Arc<BatchService>,
    executor: Arc<TaskExecutor>,
    events: Arc<dyn BatchEventSink>,
    config: WorkerConfig,
}

impl BatchWorker {
    pub fn new(
        service: Arc<BatchService>,
        executor: Arc<TaskExecutor>,
        events: Arc<dyn BatchEventSink>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            service,
            executor,
            events,
            config,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.config.worker_id
    }

    /// Take at most one job from the queue and drive it to a terminal state
    ///
    /// A store error before the job reaches `processing` puts the id back on
    /// the queue. Once the tasks have run, the final write is retried until
    /// the store accepts it.
    pub async fn run_once(&self) -> Result<WorkerTick> {
        let Some(job_id) = self.service.next_job().await? else {
            return Ok(WorkerTick::Idle);
        };

        let claimed = match self.service.claim(&job_id, &self.config.worker_id).await {
            Ok(claimed) => claimed,
            Err(e) => {
                self.give_back(&job_id).await?;
                return Err(e);
            }
        };
        if !claimed {
            info!(
                worker_id = %self.config.worker_id,
                job_id = %job_id,
                "Job claimed elsewhere, skipping"
            );
            return Ok(WorkerTick::Skipped {
                job_id,
                reason: SkipReason::Claimed,
            });
        }

        let outcome = match self.start(&job_id).await {
            Ok(Start::Ready(job)) => self.finish(job).await,
            Ok(Start::Skip(reason)) => Ok(WorkerTick::Skipped {
                job_id: job_id.clone(),
                reason,
            }),
            Err(e) => {
                self.give_back(&job_id).await?;
                return Err(e);
            }
        };

        self.release(&job_id).await;
        outcome
    }

    /// Check the record and move it to `processing`
    async fn start(&self, job_id: &str) -> Result<Start> {
        let Some(job) = self.service.status(job_id).await? else {
            error!(job_id, "Dequeued job not found");
            return Ok(Start::Skip(SkipReason::Missing));
        };
        if job.status.is_terminal() {
            info!(job_id, status = %job.status, "Dequeued job already finished");
            return Ok(Start::Skip(SkipReason::Finished(job.status)));
        }

        let Some(job) = self.service.mark_processing(job_id).await? else {
            return Ok(Start::Skip(SkipReason::Missing));
        };
        info!(
            worker_id = %self.config.worker_id,
            job_id,
            model = %job.model_id,
            tasks = job.task_count,
            "Processing batch job"
        );
        self.events.record(BatchEvent::started(&job));
        Ok(Start::Ready(job))
    }

    /// Run the tasks and record the outcome
    async fn finish(&self, job: Job) -> Result<WorkerTick> {
        let job_id = job.job_id.as_str();
        let finished = match self
            .executor
            .run(&job.model_id, &job.tasks, &job.params())
            .await
        {
            Ok(results) => {
                self.retry_store(job_id, "complete", || {
                    self.service.complete(job_id, results.clone())
                })
                .await?
            }
            Err(e) => {
                error!(job_id, "Batch job failed: {}", e);
                let message = e.to_string();
                self.retry_store(job_id, "fail", || self.service.fail(job_id, &message)).await?
            }
        };

        let Some(job) = finished else {
            return Ok(WorkerTick::Skipped {
                job_id: job_id.to_string(),
                reason: SkipReason::Missing,
            });
        };
        match job.status {
            JobStatus::Completed => {
                info!(
                    job_id = %job.job_id,
                    completed = job.completed_count,
                    failed = job.failed_count,
                    "Batch job completed"
                );
                self.events.record(BatchEvent::completed(&job));
            }
            _ => self.events.record(BatchEvent::failed(&job)),
        }

        Ok(WorkerTick::Processed {
            job_id: job.job_id,
            status: job.status,
        })
    }

    /// Repeat `op` after the poll interval for as long as the store is unavailable
    async fn retry_store<T, F, Fut>(&self, job_id: &str, action: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        loop {
            match op().await {
                Err(e) if e.is_infrastructure() => {
                    warn!(
                        worker_id = %self.config.worker_id,
                        job_id,
                        action,
                        "Store unavailable, retrying: {}",
                        e
                    );
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                other => return other,
            }
        }
    }

    /// Drop our claim and put the id back so the job is not lost
    async fn give_back(&self, job_id: &str) -> Result<()> {
        self.release(job_id).await;
        self.retry_store(job_id, "requeue", || self.service.requeue(job_id)).await?;
        info!(worker_id = %self.config.worker_id, job_id, "Job returned to the queue");
        Ok(())
    }

    async fn release(&self, job_id: &str) {
        if let Err(e) = self.service.release(job_id, &self.config.worker_id).await {
            warn!(job_id, "Failed to release job claim: {}", e);
        }
    }

    /// Loop until `shutdown` turns true or its sender goes away
    ///
    /// A job in progress is finished before the loop checks for shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(worker_id = %self.config.worker_id, "Batch worker started");

        while !*shutdown.borrow() {
            let back_off = match self.run_once().await {
                Ok(WorkerTick::Idle) => true,
                Ok(tick) => {
                    debug!(worker_id = %self.config.worker_id, ?tick, "Worker iteration done");
                    false
                }
                Err(e) => {
                    error!(worker_id = %self.config.worker_id, "Worker error: {}", e);
                    true
                }
            };

            if back_off {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        }

        info!(worker_id = %self.config.worker_id, "Batch worker stopped");
    }
}

/// Start `count` workers as Tokio tasks, ids suffixed `-0`, `-1`, ...
pub fn spawn_workers(
    count: usize,
    service: Arc<BatchService>,
    executor: Arc<TaskExecutor>,
    events: Arc<dyn BatchEventSink>,
    config: WorkerConfig,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>> {
    (0..count)
        .map(|index| {
            let worker = BatchWorker::new(
                service.clone(),
                executor.clone(),
                events.clone(),
                WorkerConfig {
                    worker_id: format!("{}-{}", config.worker_id, index),
                    poll_interval: config.poll_interval,
                },
            );
            let shutdown = shutdown.clone();
            tokio::spawn(async move { worker.run(shutdown).await })
        })
        .collect()
}
