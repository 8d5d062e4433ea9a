//! Job records, claims and the pending-job list in Redis
//!
//! Records live under `{job_key_prefix}{job_id}` as JSON with an expiry equal
//! to the retention window. The queue is a list: producers `LPUSH`, workers
//! `RPOP`, which gives FIFO order and at-most-once delivery.

use super::pool::RedisPool;
use crate::config::BatchConfig;
use crate::core::batch::types::Job;
use crate::storage::{JobQueue, JobStore};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Deletes the claim only while it still names the caller
const RELEASE_CLAIM_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Job records and claims
#[derive(Debug, Clone)]
pub struct RedisJobStore {
    pool: Arc<RedisPool>,
    job_key_prefix: String,
    lease_key_prefix: String,
    retention_secs: u64,
}

impl RedisJobStore {
    pub fn new(pool: Arc<RedisPool>, config: &BatchConfig) -> Self {
        Self {
            pool,
            job_key_prefix: config.job_key_prefix.clone(),
            lease_key_prefix: config.lease_key_prefix.clone(),
            retention_secs: config.retention_secs,
        }
    }

    pub(crate) fn job_key(&self, job_id: &str) -> String {
        format!("{}{}", self.job_key_prefix, job_id)
    }

    pub(crate) fn lease_key(&self, job_id: &str) -> String {
        format!("{}{}", self.lease_key_prefix, job_id)
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn put(&self, job: &Job) -> Result<()> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.pool.connection();
        let _: () = conn
            .set_ex(self.job_key(&job.job_id), payload, self.retention_secs)
            .await
            .map_err(GatewayError::Redis)?;
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<Job>> {
        let mut conn = self.pool.connection();
        let payload: Option<String> = conn
            .get(self.job_key(job_id))
            .await
            .map_err(GatewayError::Redis)?;

        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn try_claim(&self, job_id: &str, owner: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.pool.connection();
        let reply: Option<String> = redis::cmd("SET")
            .arg(self.lease_key(job_id))
            .arg(owner)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(GatewayError::Redis)?;

        let claimed = reply.is_some();
        debug!(job_id, owner, claimed, "Claim attempt");
        Ok(claimed)
    }

    async fn release_claim(&self, job_id: &str, owner: &str) -> Result<()> {
        let mut conn = self.pool.connection();
        let _: i64 = redis::Script::new(RELEASE_CLAIM_SCRIPT)
            .key(self.lease_key(job_id))
            .arg(owner)
            .invoke_async(&mut conn)
            .await
            .map_err(GatewayError::Redis)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.pool.health_check().await
    }
}

/// Pending job ids
#[derive(Debug, Clone)]
pub struct RedisJobQueue {
    pool: Arc<RedisPool>,
    queue_key: String,
}

impl RedisJobQueue {
    pub fn new(pool: Arc<RedisPool>, config: &BatchConfig) -> Self {
        Self {
            pool,
            queue_key: config.queue_key.clone(),
        }
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job_id: &str) -> Result<()> {
        let mut conn = self.pool.connection();
        let _: i64 = conn
            .lpush(&self.queue_key, job_id)
            .await
            .map_err(GatewayError::Redis)?;
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<String>> {
        let mut conn = self.pool.connection();
        conn.rpop(&self.queue_key, None)
            .await
            .map_err(GatewayError::Redis)
    }

    async fn len(&self) -> Result<usize> {
        let mut conn = self.pool.connection();
        conn.llen(&self.queue_key)
            .await
            .map_err(GatewayError::Redis)
    }
}
