//! Model registry
//!
//! Maps logical model ids onto backend configuration.

pub mod registry;

pub use registry::{BackendType, ModelConfig, ModelRegistry};
