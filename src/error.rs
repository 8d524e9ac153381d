//! Error types for stepgate operations.
//!
//! This module defines [`StepgateError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - The step gate itself never fails; errors come from plan loading and
//!   from the dispatcher that performs real work
//! - Errors raised inside a step propagate unchanged to the caller
//! - Use `anyhow::Error` (via `StepgateError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stepgate operations.
#[derive(Debug, Error)]
pub enum StepgateError {
    /// Plan file not found at expected location.
    #[error("Plan not found: {path}")]
    PlanNotFound { path: PathBuf },

    /// Failed to parse plan file.
    #[error("Failed to parse plan at {path}: {message}")]
    PlanParseError { path: PathBuf, message: String },

    /// A `--param` value could not be understood.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// An action referenced a target the plan does not define.
    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    /// An action referenced a task the plan does not define.
    #[error("Unknown task: {name}")]
    UnknownTask { name: String },

    /// A shell process could not be started.
    #[error("Failed to start '{command}': {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// One or more targets failed an action that did not catch errors.
    #[error("{description} failed on {failed} target(s)")]
    ActionFailed { description: String, failed: usize },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for stepgate operations.
pub type Result<T> = std::result::Result<T, StepgateError>;
