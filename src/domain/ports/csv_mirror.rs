//! Port for the CSV mirror of submitted calculations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::record::CalculationRecord;

/// Errors raised by CSV mirror adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("csv mirror write failed: {message}")]
pub struct CsvMirrorError {
    pub message: String,
}

impl CsvMirrorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Metadata about the mirror file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvMirrorInfo {
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Data rows, excluding the header. `None` when the file could not be
    /// read to count them.
    pub rows: Option<u64>,
}

/// Append-only mirror of the primary store. A mirror failure must never fail
/// the submission itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CsvMirror: Send + Sync {
    /// Append one record, writing the header first when the file is new.
    async fn append(&self, record: &CalculationRecord) -> Result<(), CsvMirrorError>;

    /// Metadata about the mirror file, or `None` when it does not exist yet.
    async fn info(&self) -> Result<Option<CsvMirrorInfo>, CsvMirrorError>;

    /// The raw mirror file contents, or `None` when it does not exist yet.
    async fn export(&self) -> Result<Option<Vec<u8>>, CsvMirrorError>;
}
