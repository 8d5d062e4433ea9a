//! Runtime assembly: configuration, storage selection and worker lifecycle

use crate::config::Config;
use crate::core::batch::{
    AsyncEventLogger, BatchEventSink, BatchService, ExecutorConfig, TaskExecutor, WorkerConfig,
    spawn_workers,
};
use crate::core::models::ModelRegistry;
use crate::core::providers::{ModelInvoker, OpenAICompatibleInvoker};
use crate::storage::BatchStorage;
use crate::utils::error::Result;
use crate::utils::init_logging;
use clap::Parser;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Configuration file read when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "config/gateway.yaml";

/// Command line shared by both binaries
#[derive(Debug, Clone, Default, Parser)]
#[command(version, about = "LLM gateway batch job processing")]
pub struct CliArgs {
    /// Gateway configuration file (YAML)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Model registry file (YAML); overrides `models.path`
    #[arg(short, long)]
    pub models: Option<PathBuf>,

    /// Number of worker loops; overrides `batch.worker_count`
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Load the gateway configuration, then apply environment overrides
pub async fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path).await?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::from_file(DEFAULT_CONFIG_PATH).await?
        }
        None => Config::default(),
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Batch service, executor and event sink for one process
pub struct BatchRuntime {
    config: Config,
    service: Arc<BatchService>,
    executor: Arc<TaskExecutor>,
    events: Arc<dyn BatchEventSink>,
}

impl BatchRuntime {
    /// Select storage and build the HTTP-backed runtime
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn connect(config: Config, registry: ModelRegistry) -> Self {
        let storage = BatchStorage::connect(config.storage(), config.batch()).await;
        let events: Arc<dyn BatchEventSink> =
            Arc::new(AsyncEventLogger::new(config.batch().event_buffer_size));
        Self::with_parts(
            config,
            Arc::new(registry),
            storage,
            Arc::new(OpenAICompatibleInvoker::new()),
            events,
        )
    }

    pub fn with_parts(
        config: Config,
        registry: Arc<ModelRegistry>,
        storage: BatchStorage,
        invoker: Arc<dyn ModelInvoker>,
        events: Arc<dyn BatchEventSink>,
    ) -> Self {
        let batch = config.batch().clone();
        let executor = Arc::new(TaskExecutor::new(
            invoker,
            registry.clone(),
            ExecutorConfig::default().with_concurrency(batch.task_concurrency),
        ));
        let service = Arc::new(BatchService::new(storage, registry, batch, events.clone()));

        Self {
            config,
            service,
            executor,
            events,
        }
    }

    pub fn service(&self) -> Arc<BatchService> {
        self.service.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start `count` worker loops listening on `shutdown`
    pub fn spawn_workers(
        &self,
        count: usize,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<JoinHandle<()>> {
        let worker_config = WorkerConfig {
            poll_interval: self.config.batch().poll_interval(),
            ..WorkerConfig::default()
        };
        spawn_workers(
            count,
            self.service.clone(),
            self.executor.clone(),
            self.events.clone(),
            worker_config,
            shutdown,
        )
    }

    /// Run `count` workers until `signal` resolves, then wait for them to stop
    pub async fn run_until<F>(self, count: usize, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = self.spawn_workers(count, shutdown_rx);
        info!(
            workers = count,
            storage = %self.service.storage_mode(),
            models = self.service.registry().len(),
            "Batch workers running"
        );

        signal.await;
        info!("Stopping batch workers");
        // Receivers outlive this send; an error only means every worker already exited
        let _ = shutdown_tx.send(true);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Worker task ended abnormally: {}", e);
            }
        }
        info!("All batch workers stopped");
        Ok(())
    }
}

/// Load everything from `args` and run until Ctrl+C / SIGTERM
pub async fn run(args: CliArgs, role: &str) -> Result<()> {
    let config = load_config(args.config.as_deref()).await?;
    init_logging(config.logging())?;
    info!("Starting {} v{}", role, crate::VERSION);

    let models_path = args
        .models
        .clone()
        .unwrap_or_else(|| config.models().path.clone());
    let registry = ModelRegistry::from_file(&models_path).await?;
    if registry.is_empty() {
        warn!(
            "Model registry {} is empty; every submission will be rejected",
            models_path.display()
        );
    }

    let workers = args.workers.unwrap_or(config.batch().worker_count).max(1);
    let runtime = BatchRuntime::connect(config, registry).await;
    runtime.run_until(workers, super::shutdown_signal()).await
}
