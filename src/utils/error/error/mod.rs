//! Error handling for the batch gateway
//!
//! This module defines all error types used throughout the gateway.

#![allow(missing_docs)]

mod conversions;
mod helpers;
mod types;

pub use types::{GatewayError, Result};
