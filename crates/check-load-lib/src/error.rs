//! Error types for the load check

use crate::models::Status;
use std::io;
use thiserror::Error;

/// Which threshold a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    Warning,
    Critical,
}

impl std::fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThresholdKind::Warning => f.write_str("Warning"),
            ThresholdKind::Critical => f.write_str("Critical"),
        }
    }
}

/// Errors raised while running the check
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("Threshold must be float or float triplet, got '{0}'")]
    InvalidFormat(String),

    #[error("{kind} threshold for {window}-minute load average is not specified")]
    MissingThreshold { kind: ThresholdKind, window: u32 },

    #[error("Parameter inconsistency: {window}-minute \"warning load\" is greater than \"critical load\"")]
    InconsistentThresholds { window: u32 },

    #[error("Load retrieval failed: {0}")]
    LoadRetrieval(String),

    #[error("Process listing failed: {0}")]
    ProcessListing(String),

    #[error("some error occurred getting procs list: not enough lines")]
    InsufficientData,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for the load check
pub type Result<T> = std::result::Result<T, CheckError>;

impl CheckError {
    /// Create a load retrieval error
    pub fn load<S: Into<String>>(msg: S) -> Self {
        CheckError::LoadRetrieval(msg.into())
    }

    /// Create a process listing error
    pub fn listing<S: Into<String>>(msg: S) -> Self {
        CheckError::ProcessListing(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        CheckError::Config(msg.into())
    }

    /// Status reported when this error ends a unit of work
    pub fn status(&self) -> Status {
        Status::Unknown
    }

    /// Whether this error aborts the whole check rather than a sub-step
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CheckError::ProcessListing(_) | CheckError::InsufficientData
        )
    }
}
