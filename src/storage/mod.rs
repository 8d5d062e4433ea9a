//! Storage layer for batch jobs
//!
//! Job records and the pending-job queue sit behind the [`JobStore`] and
//! [`JobQueue`] traits. Redis is the durable backend; when it is disabled or
//! unreachable at startup the process falls back to an in-memory backend and
//! says so in the logs.

/// In-process backend
pub mod memory;
/// Redis backend
#[cfg(feature = "redis")]
pub mod redis;

use crate::config::{BatchConfig, StorageConfig};
use crate::core::batch::types::Job;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use memory::InMemoryJobStore;

/// Keyed job record storage with a retention window
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Write the whole record and reset its retention window
    async fn put(&self, job: &Job) -> Result<()>;

    /// Read a record; expired or unknown ids yield `None`
    async fn get(&self, job_id: &str) -> Result<Option<Job>>;

    /// Take an exclusive, expiring claim on a job for `owner`
    ///
    /// Returns `false` when another owner holds a live claim.
    async fn try_claim(&self, job_id: &str, owner: &str, ttl: Duration) -> Result<bool>;

    /// Drop the claim if `owner` still holds it
    async fn release_claim(&self, job_id: &str, owner: &str) -> Result<()>;

    async fn health_check(&self) -> Result<()>;
}

/// FIFO of pending job ids
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job_id: &str) -> Result<()>;

    /// Pop the oldest id without blocking
    async fn dequeue(&self) -> Result<Option<String>>;

    async fn len(&self) -> Result<usize>;
}

/// Which backend the process ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Shared, survives restarts
    Durable,
    /// Private to this process, lost on restart
    InProcess,
}

impl std::fmt::Display for StorageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageMode::Durable => f.write_str("durable"),
            StorageMode::InProcess => f.write_str("in-process"),
        }
    }
}

/// Job store and queue selected for this process
#[derive(Clone)]
pub struct BatchStorage {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    mode: StorageMode,
}

impl std::fmt::Debug for BatchStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchStorage")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl BatchStorage {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<dyn JobQueue>, mode: StorageMode) -> Self {
        Self { store, queue, mode }
    }

    /// In-process store and queue sharing one state
    pub fn in_memory(batch: &BatchConfig) -> Self {
        let backend = Arc::new(InMemoryJobStore::new(batch.retention()));
        Self::new(backend.clone(), backend, StorageMode::InProcess)
    }

    /// Select the backend once at startup
    ///
    /// Never fails: an unusable Redis degrades to [`StorageMode::InProcess`].
    pub async fn connect(storage: &StorageConfig, batch: &BatchConfig) -> Self {
        #[cfg(feature = "redis")]
        {
            if storage.redis.enabled {
                match redis::RedisPool::new(&storage.redis).await {
                    Ok(pool) => {
                        info!("Batch storage using Redis");
                        let pool = Arc::new(pool);
                        let store = Arc::new(redis::RedisJobStore::new(pool.clone(), batch));
                        let queue = Arc::new(redis::RedisJobQueue::new(pool, batch));
                        return Self::new(store, queue, StorageMode::Durable);
                    }
                    Err(e) => {
                        warn!(
                            "Redis unavailable ({}); batch jobs will be kept in-process and lost on restart",
                            e
                        );
                    }
                }
            } else {
                warn!("Redis disabled; batch jobs will be kept in-process and lost on restart");
            }
        }

        #[cfg(not(feature = "redis"))]
        {
            let _ = storage;
            warn!(
                "Built without Redis support; batch jobs will be kept in-process and lost on restart"
            );
        }

        info!("Batch storage using in-memory backend");
        Self::in_memory(batch)
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn queue(&self) -> &Arc<dyn JobQueue> {
        &self.queue
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    pub fn is_durable(&self) -> bool {
        self.mode == StorageMode::Durable
    }
}
