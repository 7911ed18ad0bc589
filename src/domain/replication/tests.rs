//! Replication scenario tests against in-memory store fakes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::*;
use crate::domain::error::ErrorCode;
use crate::domain::ports::{MockRecordStore, MockReplicaStore};
use crate::domain::record::{NewCalculation, SyncLogEntry};
use crate::domain::shape::Shape;
use crate::domain::stats::{RecentSort, ShapeStat, SortOrder};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap()
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn record(id: i32, seconds_after_base: i64) -> CalculationRecord {
    CalculationRecord::from_new(
        id,
        NewCalculation {
            timestamp: base_time() + chrono::TimeDelta::seconds(seconds_after_base),
            name: format!("student-{id}"),
            school: "SDN 1".to_owned(),
            age: Some(10),
            address: String::new(),
            phone: String::new(),
            shape: Shape::Square,
            category: Shape::Square.category(),
            parameters: serde_json::json!({ "s": "2" }),
            result: 4.0,
        },
    )
}

/// Primary store fake over a fixed record set.
struct FakePrimary {
    records: Vec<CalculationRecord>,
    deltas_requested: Mutex<Vec<DateTime<Utc>>>,
}

impl FakePrimary {
    fn with_records(records: Vec<CalculationRecord>) -> Self {
        Self {
            records,
            deltas_requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RecordStore for FakePrimary {
    async fn ensure_schema(&self) -> Result<(), RecordStoreError> {
        Ok(())
    }

    async fn insert(
        &self,
        _record: &NewCalculation,
    ) -> Result<CalculationRecord, RecordStoreError> {
        unreachable!("replication never writes to the primary store")
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, RecordStoreError> {
        Ok(StoreSnapshot {
            total: self.records.len() as u64,
            last_record: self.records.iter().map(|r| r.timestamp).max(),
        })
    }

    async fn records_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError> {
        self.deltas_requested.lock().unwrap().push(watermark);
        let mut delta: Vec<CalculationRecord> = self
            .records
            .iter()
            .filter(|r| r.timestamp > watermark)
            .cloned()
            .collect();
        delta.sort_by_key(|r| r.timestamp);
        Ok(delta)
    }

    async fn shape_stats(&self) -> Result<Vec<ShapeStat>, RecordStoreError> {
        Ok(Vec::new())
    }

    async fn recent(
        &self,
        _sort: RecentSort,
        _order: SortOrder,
        _limit: u32,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError> {
        Ok(Vec::new())
    }
}

/// Replica store fake: keyed rows, an append-only log, and optional failure
/// injection on a specific batch.
#[derive(Default)]
struct FakeReplica {
    rows: Mutex<BTreeMap<i32, CalculationRecord>>,
    log: Mutex<Vec<SyncLogEntry>>,
    schema_calls: AtomicUsize,
    batch_sizes: Mutex<Vec<usize>>,
    fail_on_batch: Option<usize>,
}

impl FakeReplica {
    fn failing_on_batch(batch: usize) -> Self {
        Self {
            fail_on_batch: Some(batch),
            ..Self::default()
        }
    }

    fn with_log_entry(self, entry: SyncLogEntry) -> Self {
        self.log.lock().unwrap().push(entry);
        self
    }

    fn with_row(self, record: CalculationRecord) -> Self {
        self.rows.lock().unwrap().insert(record.id, record);
        self
    }

    fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn log_entries(&self) -> Vec<SyncLogEntry> {
        self.log.lock().unwrap().clone()
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplicaStore for FakeReplica {
    async fn ensure_schema(&self) -> Result<(), ReplicaStoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, ReplicaStoreError> {
        Ok(self.log.lock().unwrap().last().map(|entry| entry.sync_time))
    }

    async fn last_sync_entry(&self) -> Result<Option<SyncLogEntry>, ReplicaStoreError> {
        Ok(self.log.lock().unwrap().last().cloned())
    }

    async fn upsert_batch(&self, records: &[CalculationRecord]) -> Result<(), ReplicaStoreError> {
        let batch_number = self.batch_sizes.lock().unwrap().len() + 1;
        if self.fail_on_batch == Some(batch_number) {
            return Err(ReplicaStoreError::connection("replica unreachable"));
        }
        self.batch_sizes.lock().unwrap().push(records.len());
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            rows.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn append_sync_log(
        &self,
        sync_time: DateTime<Utc>,
        records_synced: i32,
        status: SyncStatus,
    ) -> Result<(), ReplicaStoreError> {
        let mut log = self.log.lock().unwrap();
        let id = i32::try_from(log.len()).unwrap() + 1;
        log.push(SyncLogEntry {
            id,
            sync_time,
            records_synced,
            status,
        });
        Ok(())
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, ReplicaStoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(StoreSnapshot {
            total: rows.len() as u64,
            last_record: rows.values().map(|r| r.timestamp).max(),
        })
    }
}

fn replicator(primary: Arc<FakePrimary>, replica: Arc<FakeReplica>) -> Replicator {
    Replicator::new(primary, replica, Arc::new(FixedClock(now())))
}

#[tokio::test]
async fn replicates_the_whole_delta_in_batches() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=150).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());

    let report = replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("sync succeeds");

    assert_eq!(report.records_synced, 150);
    assert_eq!(replica.row_count(), 150);
    assert_eq!(replica.batch_sizes(), vec![100, 50]);

    let log = replica.log_entries();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, SyncStatus::Success);
    assert_eq!(log[0].records_synced, 150);
    assert_eq!(log[0].sync_time, now());
}

#[tokio::test]
async fn second_run_with_no_new_data_is_a_noop() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=5).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());
    let sync = replicator(primary, replica.clone());

    sync.run_sync().await.expect("first run succeeds");
    let second = sync.run_sync().await.expect("second run succeeds");

    assert_eq!(second.records_synced, 0);
    assert_eq!(replica.row_count(), 5);
    // A no-op writes no log row and so never advances the watermark.
    assert_eq!(replica.log_entries().len(), 1);
}

#[tokio::test]
async fn watermark_is_monotonic_after_success() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=5).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());
    let sync = replicator(primary.clone(), replica);

    sync.run_sync().await.expect("first run succeeds");
    sync.run_sync().await.expect("second run succeeds");

    let watermarks = primary.deltas_requested.lock().unwrap().clone();
    assert_eq!(watermarks[0], DateTime::<Utc>::UNIX_EPOCH);
    // The second delta query starts from the successful attempt's time,
    // past every record already written.
    assert_eq!(watermarks[1], now());
    assert!(watermarks[1] > record(5, 5).timestamp);
}

#[tokio::test]
async fn empty_primary_is_a_noop_without_schema_work() {
    let primary = Arc::new(FakePrimary::with_records(Vec::new()));
    let replica = Arc::new(FakeReplica::default());

    let report = replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("noop succeeds");

    assert_eq!(report.records_synced, 0);
    assert_eq!(replica.schema_calls.load(Ordering::SeqCst), 0);
    assert!(replica.log_entries().is_empty());
}

#[tokio::test]
async fn a_delta_of_exactly_one_batch_stays_one_batch() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=100).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());

    replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("sync succeeds");

    assert_eq!(replica.batch_sizes(), vec![100]);
}

#[tokio::test]
async fn one_record_past_the_batch_size_spills_into_a_second_batch() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=101).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());

    replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("sync succeeds");

    assert_eq!(replica.batch_sizes(), vec![100, 1]);
}

#[tokio::test]
async fn custom_batch_sizes_partition_the_delta() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=7).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::default());

    replicator(primary, replica.clone())
        .with_batch_size(3)
        .run_sync()
        .await
        .expect("sync succeeds");

    assert_eq!(replica.batch_sizes(), vec![3, 3, 1]);
}

#[tokio::test]
async fn failure_in_the_second_batch_keeps_the_first_and_logs_a_failed_attempt() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=150).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::failing_on_batch(2));

    let error = replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect_err("second batch fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    // Documented partial-write semantics: batch one stays committed while
    // the log row reports a zero count.
    assert_eq!(replica.row_count(), 100);
    let log = replica.log_entries();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].status, SyncStatus::Failed);
    assert_eq!(log[0].records_synced, 0);
}

#[tokio::test]
async fn retrying_after_a_partial_failure_upserts_without_duplicates() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=150).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(FakeReplica::failing_on_batch(2));
    let clock = Arc::new(FixedClock(base_time()));
    // A failure logged at base_time leaves the watermark below every
    // record, so the retry re-reads the full delta and overwrites batch
    // one's rows in place.
    let sync = Replicator::new(primary, replica.clone(), clock);

    sync.run_sync().await.expect_err("first attempt fails");
    sync.run_sync().await.expect("retry succeeds");

    assert_eq!(replica.row_count(), 150);
    let log = replica.log_entries();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].status, SyncStatus::Success);
    assert_eq!(log[1].records_synced, 150);
}

#[tokio::test]
async fn resending_the_same_id_overwrites_rather_than_duplicates() {
    let stale = {
        let mut r = record(1, 1);
        r.result = 1.0;
        r
    };
    let fresh = record(1, 1);
    let primary = Arc::new(FakePrimary::with_records(vec![fresh.clone()]));
    let replica = Arc::new(FakeReplica::default().with_row(stale));

    replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("sync succeeds");

    assert_eq!(replica.row_count(), 1);
    assert_eq!(replica.rows.lock().unwrap()[&1].result, fresh.result);
}

#[tokio::test]
async fn failed_attempt_timestamp_floors_the_next_delta() {
    // Preserved source semantics: the watermark is the latest log row
    // regardless of status, so records older than a failed attempt's
    // timestamp are never re-selected.
    let failed_at = base_time() + chrono::TimeDelta::seconds(100);
    let primary = Arc::new(FakePrimary::with_records(vec![record(1, 50)]));
    let replica = Arc::new(FakeReplica::default().with_log_entry(SyncLogEntry {
        id: 1,
        sync_time: failed_at,
        records_synced: 0,
        status: SyncStatus::Failed,
    }));

    let report = replicator(primary, replica.clone())
        .run_sync()
        .await
        .expect("run succeeds as a noop");

    assert_eq!(report.records_synced, 0);
    assert_eq!(replica.row_count(), 0);
}

#[tokio::test]
async fn primary_connection_failure_maps_to_service_unavailable() {
    let mut primary = MockRecordStore::new();
    primary
        .expect_records_after()
        .times(1)
        .returning(|_| Err(RecordStoreError::connection("pool exhausted")));
    let mut replica = MockReplicaStore::new();
    replica
        .expect_last_sync_time()
        .times(1)
        .returning(|| Ok(None));

    let sync = Replicator::new(
        Arc::new(primary),
        Arc::new(replica),
        Arc::new(FixedClock(now())),
    );
    let error = sync.run_sync().await.expect_err("primary unreachable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn sync_status_compares_the_two_stores() {
    let primary = Arc::new(FakePrimary::with_records(
        (1..=4).map(|i| record(i, i64::from(i))).collect(),
    ));
    let replica = Arc::new(
        FakeReplica::default()
            .with_row(record(1, 1))
            .with_log_entry(SyncLogEntry {
                id: 1,
                sync_time: base_time(),
                records_synced: 1,
                status: SyncStatus::Success,
            }),
    );

    let status = replicator(primary, replica)
        .sync_status()
        .await
        .expect("status succeeds");

    assert_eq!(status.local.total, 4);
    assert_eq!(status.replica.total, 1);
    assert!(status.configured);
    assert_eq!(status.recommendation, Recommendation::RunSync);
    assert_eq!(
        status.last_sync.expect("log entry").status,
        SyncStatus::Success
    );
}

#[tokio::test]
async fn sync_status_degrades_when_the_replica_is_unreachable() {
    let primary = Arc::new(FakePrimary::with_records(vec![record(1, 1)]));
    let mut replica = MockReplicaStore::new();
    replica
        .expect_snapshot()
        .times(1)
        .returning(|| Err(ReplicaStoreError::connection("refused")));
    replica
        .expect_last_sync_entry()
        .times(1)
        .returning(|| Err(ReplicaStoreError::connection("refused")));

    let sync = Replicator::new(primary, Arc::new(replica), Arc::new(FixedClock(now())));
    let status = sync.sync_status().await.expect("status degrades");

    assert_eq!(status.local.total, 1);
    assert_eq!(status.replica.total, 0);
    assert!(status.last_sync.is_none());
    assert_eq!(status.recommendation, Recommendation::RunSync);
}

#[tokio::test]
async fn unconfigured_sync_rejects_triggers_and_reports_local_state() {
    let primary = Arc::new(FakePrimary::with_records(vec![record(1, 1)]));
    let sync = UnconfiguredSync::new(primary);

    let error = sync.run_sync().await.expect_err("no replica configured");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);

    let status = sync.sync_status().await.expect("status still works");
    assert!(!status.configured);
    assert_eq!(status.local.total, 1);
    assert_eq!(status.recommendation, Recommendation::ConfigureReplica);
}
