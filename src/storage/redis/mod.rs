//! Redis storage backend
//!
//! ## Module Structure
//!
//! - `pool` - Connection setup and health checks
//! - `jobs` - Job records, claims and the pending-job list
//! - `tests` - Module tests

mod jobs;
mod pool;

pub use jobs::{RedisJobQueue, RedisJobStore};
pub use pool::RedisPool;
