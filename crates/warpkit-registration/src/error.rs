//! Error types for cost evaluation and stream scheduling.
//!
//! Field errors from `warpkit-core` convert transparently so callers deal
//! with a single error type.

use thiserror::Error;
use warpkit_core::FieldError;

/// Main error type for registration operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    /// Error raised by the displacement field or its device mirror.
    #[error("Field error: {0}")]
    Field(#[from] FieldError),

    /// The stream worker is gone and can no longer accept or run jobs.
    #[error("Stream disconnected: {0}")]
    StreamDisconnected(String),

    /// A queued job panicked while running.
    #[error("Job panicked on stream '{stream}': {message}")]
    JobPanicked { stream: String, message: String },

    /// A region does not fit the lattice it addresses.
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for registration operations.
pub type Result<T> = std::result::Result<T, RegistrationError>;

impl RegistrationError {
    /// Create a stream disconnected error.
    pub fn stream_disconnected(msg: impl Into<String>) -> Self {
        Self::StreamDisconnected(msg.into())
    }

    /// Create a job panicked error.
    pub fn job_panicked(stream: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JobPanicked {
            stream: stream.into(),
            message: message.into(),
        }
    }

    /// Create an invalid region error.
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
