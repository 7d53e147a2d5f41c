//! Error types for Neuroscreen

use thiserror::Error;

/// Errors that can occur during computation or recording
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Numeric error: {0}")]
    Numeric(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Recorder error: {0}")]
    Recorder(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ComputeError {
    /// Short machine-readable code used by the CLI and FFI layers
    pub fn code(&self) -> &'static str {
        match self {
            ComputeError::Validation(_) => "VALIDATION_ERROR",
            ComputeError::Numeric(_) => "NUMERIC_ERROR",
            ComputeError::Io(_) => "IO_ERROR",
            ComputeError::Json(_) => "JSON_ERROR",
            ComputeError::Recorder(_) => "RECORDER_ERROR",
            ComputeError::Config(_) => "CONFIG_ERROR",
        }
    }
}
