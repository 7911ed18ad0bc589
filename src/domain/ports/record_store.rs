//! Port for the primary calculation store (the system of record).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::record::{CalculationRecord, NewCalculation, StoreSnapshot};
use crate::domain::stats::{RecentSort, ShapeStat, SortOrder};

/// Errors raised by primary store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordStoreError {
    /// The store is unreachable or the pool is exhausted.
    #[error("record store connection failed: {message}")]
    Connection { message: String },
    /// A query or mutation failed during execution.
    #[error("record store query failed: {message}")]
    Query { message: String },
}

impl RecordStoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for reading and writing the primary `calculations` table.
///
/// Replication only ever reads through this port; the primary store is never
/// mutated by a sync run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the `calculations` table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), RecordStoreError>;

    /// Persist a new submission and return it with its assigned id.
    async fn insert(&self, record: &NewCalculation)
        -> Result<CalculationRecord, RecordStoreError>;

    /// Row count and newest record timestamp.
    async fn snapshot(&self) -> Result<StoreSnapshot, RecordStoreError>;

    /// All records strictly newer than `watermark`, ascending by timestamp.
    ///
    /// Ascending order is a correctness requirement for replication: an
    /// interrupted run must leave a watermark no later than the last record
    /// actually written.
    async fn records_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError>;

    /// Count, average, minimum and maximum result per shape.
    async fn shape_stats(&self) -> Result<Vec<ShapeStat>, RecordStoreError>;

    /// The most recent records under the requested ordering.
    async fn recent(
        &self,
        sort: RecentSort,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError>;
}
