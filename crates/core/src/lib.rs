//! Core functionality for the regulatory-domain controller.
//!
//! This crate provides the configuration, error, logging and time
//! utilities shared across the regdomain workspace.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::{Config, LoggingConfig, RegulatoryConfig};
pub use error::CoreError;
pub use types::current_timestamp_ms;
