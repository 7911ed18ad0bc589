//! Incremental replication from the primary store into the replica.
//!
//! The replicator reads the watermark from the replica's sync log, pulls the
//! primary delta in ascending timestamp order, upserts it in fixed-size
//! batches, and appends one sync-log row per attempt. Replication is
//! at-least-once: batches committed before a failure are not rolled back,
//! and the upsert keyed by record id makes retries safe.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::error::Error;
use crate::domain::ports::{
    Recommendation, RecordStore, RecordStoreError, ReplicaStore, ReplicaStoreError,
    SyncCommand, SyncComparison, SyncQuery, SyncReport,
};
use crate::domain::record::{CalculationRecord, StoreSnapshot, SyncStatus};

/// Default number of records upserted per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

fn map_record_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Connection { message } => {
            Error::service_unavailable(format!("record store unavailable: {message}"))
        }
        RecordStoreError::Query { message } => {
            Error::internal(format!("record store error: {message}"))
        }
    }
}

fn map_replica_error(error: ReplicaStoreError) -> Error {
    match error {
        ReplicaStoreError::Connection { message } => {
            Error::service_unavailable(format!("replica store unavailable: {message}"))
        }
        ReplicaStoreError::Query { message } => {
            Error::internal(format!("replica store error: {message}"))
        }
    }
}

/// Replicates primary records into the replica store.
///
/// Invocations are serialised by an in-process mutex: a manual trigger and a
/// timer tick queue behind one another instead of racing on the same
/// watermark and double-appending sync-log rows.
pub struct Replicator {
    primary: Arc<dyn RecordStore>,
    replica: Arc<dyn ReplicaStore>,
    clock: Arc<dyn Clock>,
    batch_size: usize,
    gate: tokio::sync::Mutex<()>,
}

impl Replicator {
    pub fn new(
        primary: Arc<dyn RecordStore>,
        replica: Arc<dyn ReplicaStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            primary,
            replica,
            clock,
            batch_size: DEFAULT_BATCH_SIZE,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ensure the destination schema exists and push the delta batch by
    /// batch. Returns the number of records written.
    async fn push_delta(&self, delta: &[CalculationRecord]) -> Result<u32, Error> {
        self.replica
            .ensure_schema()
            .await
            .map_err(map_replica_error)?;

        for (index, batch) in delta.chunks(self.batch_size).enumerate() {
            self.replica
                .upsert_batch(batch)
                .await
                .map_err(map_replica_error)?;
            debug!(batch = index + 1, records = batch.len(), "replicated batch");
        }

        Ok(u32::try_from(delta.len()).unwrap_or(u32::MAX))
    }

    async fn append_log(&self, records_synced: u32, status: SyncStatus) -> Result<(), Error> {
        let count = i32::try_from(records_synced).unwrap_or(i32::MAX);
        self.replica
            .append_sync_log(self.clock.utc(), count, status)
            .await
            .map_err(map_replica_error)
    }
}

#[async_trait]
impl SyncCommand for Replicator {
    /// Run one replication attempt.
    ///
    /// An empty delta is a no-op: it reports zero records and writes no
    /// sync-log row, so the watermark never advances falsely. Any failure
    /// after the delta read is recorded as a `failed` attempt (best effort)
    /// and surfaced to the caller; retry is the scheduler's business.
    async fn run_sync(&self) -> Result<SyncReport, Error> {
        let _guard = self.gate.lock().await;

        let watermark = self
            .replica
            .last_sync_time()
            .await
            .map_err(map_replica_error)?
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let delta = self
            .primary
            .records_after(watermark)
            .await
            .map_err(map_record_error)?;

        if delta.is_empty() {
            debug!(%watermark, "no records newer than watermark");
            return Ok(SyncReport { records_synced: 0 });
        }

        info!(records = delta.len(), %watermark, "replicating delta");

        match self.push_delta(&delta).await {
            Ok(count) => {
                self.append_log(count, SyncStatus::Success).await?;
                info!(records = count, "replication succeeded");
                Ok(SyncReport {
                    records_synced: count,
                })
            }
            Err(cause) => {
                // Earlier batches stay committed; the log row records the
                // attempt with a zero count regardless.
                if let Err(log_err) = self.append_log(0, SyncStatus::Failed).await {
                    warn!(error = %log_err, "could not record failed sync attempt");
                }
                warn!(error = %cause, "replication failed");
                Err(cause)
            }
        }
    }
}

#[async_trait]
impl SyncQuery for Replicator {
    /// Compare primary and replica state. Replica-side read failures degrade
    /// to zeroes so the status page stays up while the replica is down.
    async fn sync_status(&self) -> Result<SyncComparison, Error> {
        let local = self.primary.snapshot().await.map_err(map_record_error)?;

        let replica = match self.replica.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "replica snapshot unavailable");
                StoreSnapshot::default()
            }
        };
        let last_sync = match self.replica.last_sync_entry().await {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "sync log unavailable");
                None
            }
        };

        let recommendation = Recommendation::from_counts(true, local.total, replica.total);
        Ok(SyncComparison {
            local,
            replica,
            last_sync,
            configured: true,
            recommendation,
        })
    }
}

/// Stand-in wired when no replica credentials are configured: sync triggers
/// are rejected and the status endpoint reports the primary side only.
pub struct UnconfiguredSync {
    primary: Arc<dyn RecordStore>,
}

impl UnconfiguredSync {
    pub fn new(primary: Arc<dyn RecordStore>) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl SyncCommand for UnconfiguredSync {
    async fn run_sync(&self) -> Result<SyncReport, Error> {
        Err(Error::service_unavailable(
            "replica store is not configured; set the replica database host to enable sync",
        ))
    }
}

#[async_trait]
impl SyncQuery for UnconfiguredSync {
    async fn sync_status(&self) -> Result<SyncComparison, Error> {
        let local = self.primary.snapshot().await.map_err(map_record_error)?;
        Ok(SyncComparison {
            local,
            replica: StoreSnapshot::default(),
            last_sync: None,
            configured: false,
            recommendation: Recommendation::from_counts(false, local.total, 0),
        })
    }
}

#[cfg(test)]
mod tests;
