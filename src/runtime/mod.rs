//! Process wiring shared by the `gateway` and `batch-worker` binaries

pub mod builder;
pub mod signal;

pub use builder::{BatchRuntime, CliArgs, load_config, run};
pub use signal::shutdown_signal;
