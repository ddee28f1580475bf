//! Error types for scriptorium operations.
//!
//! This module defines [`ScriptoriumError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Per-script failures (scan, probe, launch, install) are contained to that
//!   script's lifecycle and reported through the UI; they never abort the
//!   orchestrator
//! - Use `ScriptoriumError` for domain errors that need distinct handling
//! - Use `anyhow::Error` (via `ScriptoriumError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::requirements::scanner::ScanError;

/// Core error type for scriptorium operations.
#[derive(Debug, Error)]
pub enum ScriptoriumError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Script name is not present in the catalog.
    #[error("Unknown script: {name}")]
    UnknownScript { name: String },

    /// Script source could not be read.
    #[error("Failed to read script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Script source could not be parsed for imports.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Child process could not be started.
    #[error("Failed to launch '{script}': {message}")]
    LaunchFailed { script: String, message: String },

    /// Package manager exited unsuccessfully.
    #[error("Installing {packages} failed with exit code {code:?}")]
    InstallFailed { packages: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for scriptorium operations.
pub type Result<T> = std::result::Result<T, ScriptoriumError>;
