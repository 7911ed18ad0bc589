//! Port for the downstream replica store and its sync log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::record::{CalculationRecord, StoreSnapshot, SyncLogEntry, SyncStatus};

/// Errors raised by replica store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicaStoreError {
    /// The store is unreachable, the pool is exhausted, or schema creation
    /// failed.
    #[error("replica store connection failed: {message}")]
    Connection { message: String },
    /// A query or mutation failed during execution.
    #[error("replica store query failed: {message}")]
    Query { message: String },
}

impl ReplicaStoreError {
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

/// Port for the replica `calculations` table and the append-only `sync_log`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReplicaStore: Send + Sync {
    /// Create the replica tables if they do not exist. Idempotent.
    async fn ensure_schema(&self) -> Result<(), ReplicaStoreError>;

    /// The `sync_time` of the most recent sync-log row, regardless of its
    /// status. `None` when the log is empty or its table does not exist yet.
    ///
    /// Taking the latest attempt rather than the latest *successful* attempt
    /// preserves the source system's watermark semantics; a failed attempt's
    /// timestamp floors the next delta query.
    async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, ReplicaStoreError>;

    /// The most recent sync-log row, or `None` when the log is empty or its
    /// table does not exist yet.
    async fn last_sync_entry(&self) -> Result<Option<SyncLogEntry>, ReplicaStoreError>;

    /// Insert-or-overwrite the batch keyed by record id.
    async fn upsert_batch(&self, records: &[CalculationRecord]) -> Result<(), ReplicaStoreError>;

    /// Append one sync-log row. Creates the log table on demand so a failed
    /// attempt can be recorded before `ensure_schema` has ever succeeded.
    async fn append_sync_log(
        &self,
        sync_time: DateTime<Utc>,
        records_synced: i32,
        status: SyncStatus,
    ) -> Result<(), ReplicaStoreError>;

    /// Row count and newest record timestamp of the replica table. Zeroes
    /// when the table does not exist yet.
    async fn snapshot(&self) -> Result<StoreSnapshot, ReplicaStoreError>;
}
