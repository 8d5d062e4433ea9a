//! End-to-end tests against a live Redis
//!
//! Run with: `REDIS_URL=redis://localhost:6379/15 cargo test -- --ignored`

pub mod redis_batch;
