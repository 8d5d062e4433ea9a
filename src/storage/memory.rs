//! In-memory job store and queue
//!
//! Used when Redis is disabled or unreachable. State is private to the
//! process and gone after a restart.

use super::{JobQueue, JobStore};
use crate::core::batch::types::Job;
use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

/// Upper bound on how often `put` sweeps expired records
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

struct StoredJob {
    job: Job,
    expires_at: Instant,
}

struct Claim {
    owner: String,
    expires_at: Instant,
}

#[derive(Default)]
struct MemoryState {
    jobs: HashMap<String, StoredJob>,
    queue: VecDeque<String>,
    claims: HashMap<String, Claim>,
    last_purge: Option<Instant>,
}

/// Job store and queue backed by process memory
pub struct InMemoryJobStore {
    state: RwLock<MemoryState>,
    retention: Duration,
    purge_interval: Duration,
}

impl InMemoryJobStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            retention,
            purge_interval: retention.min(PURGE_INTERVAL),
        }
    }

    /// Sweep only when the last sweep is older than the purge interval
    fn purge_if_due(&self) {
        let due = self
            .state
            .read()
            .last_purge
            .is_none_or(|last| last.elapsed() >= self.purge_interval);
        if due {
            self.purge_expired();
        }
    }

    /// Drop expired records and claims, returning how many records went away
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.write();
        state.last_purge = Some(now);
        let before = state.jobs.len();
        state.jobs.retain(|_, stored| stored.expires_at > now);
        state.claims.retain(|_, claim| claim.expires_at > now);
        let purged = before - state.jobs.len();
        if purged > 0 {
            debug!("Purged {} expired batch jobs", purged);
        }
        purged
    }

    /// Number of live records
    pub fn job_count(&self) -> usize {
        let now = Instant::now();
        self.state
            .read()
            .jobs
            .values()
            .filter(|stored| stored.expires_at > now)
            .count()
    }
}

impl std::fmt::Debug for InMemoryJobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("InMemoryJobStore")
            .field("jobs", &state.jobs.len())
            .field("queued", &state.queue.len())
            .field("retention", &self.retention)
            .finish()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: &Job) -> Result<()> {
        self.purge_if_due();
        let stored = StoredJob {
            job: job.clone(),
            expires_at: Instant::now() + self.retention,
        };
        self.state.write().jobs.insert(job.job_id.clone(), stored);
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<Job>> {
        let now = Instant::now();
        let state = self.state.read();
        Ok(state
            .jobs
            .get(job_id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| stored.job.clone()))
    }

    async fn try_claim(&self, job_id: &str, owner: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut state = self.state.write();
        if let Some(claim) = state.claims.get(job_id) {
            if claim.expires_at > now {
                return Ok(false);
            }
        }
        state.claims.insert(
            job_id.to_string(),
            Claim {
                owner: owner.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn release_claim(&self, job_id: &str, owner: &str) -> Result<()> {
        let mut state = self.state.write();
        if state
            .claims
            .get(job_id)
            .is_some_and(|claim| claim.owner == owner)
        {
            state.claims.remove(job_id);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl JobQueue for InMemoryJobStore {
    async fn enqueue(&self, job_id: &str) -> Result<()> {
        self.state.write().queue.push_back(job_id.to_string());
        Ok(())
    }

    async fn dequeue(&self) -> Result<Option<String>> {
        Ok(self.state.write().queue.pop_front())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.state.read().queue.len())
    }
}
