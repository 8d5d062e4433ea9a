//! Task executor
//!
//! Runs every task of a job against the job's model. A task failure becomes
//! an error entry in that task's result; only a missing model or a backend
//! that could not be reached for any task fails the job as a whole.

use super::types::{Task, TaskResult};
use crate::core::models::ModelRegistry;
use crate::core::providers::{ModelInvoker, ProviderError};
use crate::core::types::{ChatMessage, Completion, GenerationParams};
use crate::utils::error::{GatewayError, Result};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Executor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Tasks in flight per job; 1 runs them strictly in order
    pub concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

impl ExecutorConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Runs the tasks of one job
pub struct TaskExecutor {
    invoker: Arc<dyn ModelInvoker>,
    registry: Arc<ModelRegistry>,
    config: ExecutorConfig,
}

impl TaskExecutor {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        registry: Arc<ModelRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            invoker,
            registry,
            config,
        }
    }

    /// Execute `tasks` and return one result per task, in task order
    pub async fn run(
        &self,
        model_id: &str,
        tasks: &[Task],
        params: &GenerationParams,
    ) -> Result<Vec<TaskResult>> {
        let model = self
            .registry
            .get_model(model_id)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| GatewayError::unknown_model(model_id))?;
        let timeout = Duration::from_secs(model.timeout);
        let provider = model.backend_type.as_str();

        debug!(
            model_id,
            tasks = tasks.len(),
            concurrency = self.config.concurrency,
            "Executing batch tasks"
        );

        // Each task future owns what it touches so the whole run stays `Send`
        let model_id: Arc<str> = Arc::from(model_id);
        let params = *params;
        let pending: Vec<(usize, String, Vec<ChatMessage>)> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (index, task.id.clone(), task.messages.clone()))
            .collect();

        let mut outcomes: Vec<(usize, std::result::Result<Completion, ProviderError>)> =
            stream::iter(pending)
                .map(|(index, task_id, messages)| {
                    let invoker = Arc::clone(&self.invoker);
                    let model = Arc::clone(&model);
                    let model_id = Arc::clone(&model_id);
                    async move {
                        let outcome = tokio::time::timeout(
                            timeout,
                            invoker.invoke(&model_id, &model, &messages, &params),
                        )
                        .await
                        .unwrap_or_else(|_| {
                            Err(ProviderError::timeout(
                                provider,
                                format!("task {} timed out after {:?}", task_id, timeout),
                            ))
                        });
                        (index, outcome)
                    }
                })
                .buffer_unordered(self.config.concurrency.max(1))
                .collect()
                .await;

        // Restore task order
        outcomes.sort_by_key(|(index, _)| *index);

        if let Some(err) = all_unreachable(&outcomes) {
            return Err(err.clone().into());
        }

        Ok(outcomes
            .into_iter()
            .zip(tasks)
            .map(|((_, outcome), task)| match outcome {
                Ok(completion) => TaskResult::success(task.id.clone(), completion),
                Err(e) => {
                    warn!(model_id = %model_id, task_id = %task.id, "Task failed: {}", e);
                    TaskResult::failure(task.id.clone(), e.to_string())
                }
            })
            .collect())
    }
}

/// The last error when every task failed to reach the backend
fn all_unreachable(
    outcomes: &[(usize, std::result::Result<Completion, ProviderError>)],
) -> Option<&ProviderError> {
    let mut last = None;
    for (_, outcome) in outcomes {
        match outcome {
            Err(e) if e.is_unreachable() => last = Some(e),
            _ => return None,
        }
    }
    last
}
