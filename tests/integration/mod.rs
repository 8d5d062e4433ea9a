//! Integration tests for llm-batch-gateway
//!
//! These tests drive the public API end to end over the in-memory backend
//! and a mock HTTP model server.

pub mod config_tests;
pub mod invoker_tests;
pub mod worker_pool_tests;
