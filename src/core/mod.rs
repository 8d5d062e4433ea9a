//! Core functionality for the batch gateway
//!
//! - **batch**: job model, service, executor and worker loop
//! - **models**: model registry
//! - **providers**: model invocation
//! - **types**: chat messages, generation parameters and usage

pub mod batch;
pub mod models;
pub mod providers;
pub mod types;
