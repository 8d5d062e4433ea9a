//! Test fixtures and data factories

use super::events::CapturingEventSink;
use super::providers::ScriptedInvoker;
use llm_batch_gateway::config::{BatchConfig, Config};
use llm_batch_gateway::core::batch::{
    BatchService, BatchWorker, ExecutorConfig, Task, TaskExecutor, WorkerConfig,
};
use llm_batch_gateway::core::models::{ModelConfig, ModelRegistry};
use llm_batch_gateway::core::types::ChatMessage;
use llm_batch_gateway::storage::BatchStorage;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Model id registered by [`registry`]
pub const TEST_MODEL: &str = "test-model";

/// Registry with [`TEST_MODEL`] pointing at a local placeholder backend
pub fn registry() -> Arc<ModelRegistry> {
    let mut models = HashMap::new();
    let mut model = ModelConfig::new("test/model-7b", Some("http://127.0.0.1:9/v1".to_string()));
    model.timeout = 2;
    models.insert(TEST_MODEL.to_string(), model);
    Arc::new(ModelRegistry::from_models(models))
}

/// Config tuned for fast tests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.gateway.storage.redis.enabled = false;
    config.gateway.batch.poll_interval_secs = 1;
    config
}

/// Factory for tasks
pub struct TaskFactory;

impl TaskFactory {
    pub fn task(id: &str, prompt: &str) -> Task {
        Task::new(id, vec![ChatMessage::user(prompt)])
    }

    pub fn with_system(id: &str, system: &str, prompt: &str) -> Task {
        Task::new(
            id,
            vec![ChatMessage::system(system), ChatMessage::user(prompt)],
        )
    }

    /// `count` tasks with ids `t0..` and prompts `prompt 0..`
    pub fn many(count: usize) -> Vec<Task> {
        (0..count)
            .map(|i| Self::task(&format!("t{}", i), &format!("prompt {}", i)))
            .collect()
    }
}

/// Service, worker and collaborators over the in-memory backend
pub struct TestHarness {
    pub service: Arc<BatchService>,
    pub executor: Arc<TaskExecutor>,
    pub storage: BatchStorage,
    pub invoker: Arc<ScriptedInvoker>,
    pub events: Arc<CapturingEventSink>,
    pub batch: BatchConfig,
}

impl TestHarness {
    pub fn new(invoker: ScriptedInvoker) -> Self {
        Self::with_config(invoker, BatchConfig::default())
    }

    pub fn with_config(invoker: ScriptedInvoker, batch: BatchConfig) -> Self {
        let storage = BatchStorage::in_memory(&batch);
        Self::with_storage(invoker, batch, storage)
    }

    pub fn with_storage(
        invoker: ScriptedInvoker,
        batch: BatchConfig,
        storage: BatchStorage,
    ) -> Self {
        let registry = registry();
        let invoker = Arc::new(invoker);
        let events = Arc::new(CapturingEventSink::new());

        let executor = Arc::new(TaskExecutor::new(
            invoker.clone(),
            registry.clone(),
            ExecutorConfig::default().with_concurrency(batch.task_concurrency),
        ));
        let service = Arc::new(BatchService::new(
            storage.clone(),
            registry,
            batch.clone(),
            events.clone(),
        ));

        Self {
            service,
            executor,
            storage,
            invoker,
            events,
            batch,
        }
    }

    /// Worker sharing this harness' service
    pub fn worker(&self, worker_id: &str) -> BatchWorker {
        BatchWorker::new(
            self.service.clone(),
            self.executor.clone(),
            self.events.clone(),
            WorkerConfig::new(worker_id, Duration::from_millis(20)),
        )
    }

    /// Submit with default parameters and no metadata
    pub async fn submit(&self, tasks: Vec<Task>) -> String {
        self.service
            .submit_batch_job(TEST_MODEL, tasks, None, None, None, None)
            .await
            .expect("submission accepted")
    }
}
