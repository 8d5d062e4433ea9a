//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `storage_validators`: Storage-related validators
//! - `batch_validators`: Batch, logging and top-level validators
//! - `tests`: Test suite for all validators

mod batch_validators;
mod storage_validators;
mod trait_def;

pub use trait_def::Validate;
