//! Persistence sink trait and error types

use crate::entity::EntityRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output file {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Output sink used before initialize()")]
    NotInitialized,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for entity records
///
/// Implementations write the header once per run and then one complete
/// row per `append` call, so an interrupted run loses at most the record
/// being written.
pub trait RecordSink {
    /// Truncates or creates the destination and writes the header
    fn initialize(&mut self) -> OutputResult<()>;

    /// Writes one record and flushes it
    fn append(&mut self, record: &EntityRecord) -> OutputResult<()>;
}
