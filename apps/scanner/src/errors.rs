use std::path::PathBuf;

use thiserror::Error;

use crate::extraction::model::ModelError;
use crate::store::StoreError;

/// Fatal, run-level error. Any of these aborts the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Language model unavailable: {0}")]
    Model(#[from] ModelError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Job requirement file {path}: {reason}")]
    JobRequirement { path: PathBuf, reason: String },

    #[error("Input directory {path}: {source}")]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Per-document failure. Reported in the batch summary; never aborts the batch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DocumentError {
    #[error("unreadable file: {0}")]
    Unreadable(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("no text found in document")]
    EmptyDocument,

    #[error("worker failed: {0}")]
    Worker(String),
}

impl AppError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Model(_) => 2,
            AppError::Config(_) | AppError::JobRequirement { .. } | AppError::InputDir { .. } => 3,
            AppError::Store(_) => 4,
        }
    }
}
