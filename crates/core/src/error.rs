//! Core error types

use thiserror::Error;

/// Core error type for the regdomain workspace
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Event loop is no longer accepting events
    #[error("Event channel closed")]
    ChannelClosed,
}
