//! MySQL-backed [`ReplicaStore`] adapter for the secondary database.
//!
//! The replica side tolerates a database that has never been written to:
//! queries against a missing table report "nothing there yet" rather than an
//! error, so the first sync run can bootstrap the schema itself.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{QueryBuilder, Row};

use crate::domain::ports::{ReplicaStore, ReplicaStoreError};
use crate::domain::record::{CalculationRecord, StoreSnapshot, SyncLogEntry, SyncStatus};

use super::pool::DbPool;
use super::support::{is_connection_error, is_missing_table};

const CREATE_CALCULATIONS: &str = "\
CREATE TABLE IF NOT EXISTS calculations (
  id INT PRIMARY KEY,
  timestamp DATETIME NOT NULL,
  name VARCHAR(255),
  school VARCHAR(255),
  age INT,
  address TEXT,
  phone VARCHAR(50),
  shape VARCHAR(50),
  type VARCHAR(20),
  parameters JSON,
  result DOUBLE,
  INDEX idx_timestamp (timestamp),
  INDEX idx_shape (shape)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

const CREATE_SYNC_LOG: &str = "\
CREATE TABLE IF NOT EXISTS sync_log (
  id INT AUTO_INCREMENT PRIMARY KEY,
  sync_time DATETIME NOT NULL,
  records_synced INT,
  status VARCHAR(20)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4";

/// sqlx implementation of the replica store port.
#[derive(Clone)]
pub struct MySqlReplicaStore {
    pool: DbPool,
}

impl MySqlReplicaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: sqlx::Error) -> ReplicaStoreError {
    if is_connection_error(&error) {
        ReplicaStoreError::connection(error.to_string())
    } else {
        ReplicaStoreError::query(error.to_string())
    }
}

fn decode_log_entry(row: &MySqlRow) -> Result<SyncLogEntry, ReplicaStoreError> {
    let sync_time: NaiveDateTime = row.try_get("sync_time").map_err(map_error)?;
    let status_name: String = row.try_get("status").map_err(map_error)?;
    let status: SyncStatus = status_name.parse().map_err(ReplicaStoreError::query)?;
    Ok(SyncLogEntry {
        id: row.try_get("id").map_err(map_error)?,
        sync_time: sync_time.and_utc(),
        records_synced: row
            .try_get::<Option<i32>, _>("records_synced")
            .map_err(map_error)?
            .unwrap_or(0),
        status,
    })
}

#[async_trait]
impl ReplicaStore for MySqlReplicaStore {
    async fn ensure_schema(&self) -> Result<(), ReplicaStoreError> {
        sqlx::query(CREATE_CALCULATIONS)
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        sqlx::query(CREATE_SYNC_LOG)
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn last_sync_time(&self) -> Result<Option<DateTime<Utc>>, ReplicaStoreError> {
        let row = sqlx::query("SELECT sync_time FROM sync_log ORDER BY sync_time DESC LIMIT 1")
            .fetch_optional(self.pool.inner())
            .await;
        match row {
            Ok(Some(row)) => {
                let sync_time: NaiveDateTime = row.try_get("sync_time").map_err(map_error)?;
                Ok(Some(sync_time.and_utc()))
            }
            Ok(None) => Ok(None),
            Err(error) if is_missing_table(&error) => Ok(None),
            Err(error) => Err(map_error(error)),
        }
    }

    async fn last_sync_entry(&self) -> Result<Option<SyncLogEntry>, ReplicaStoreError> {
        let row = sqlx::query(
            "SELECT id, sync_time, records_synced, status
             FROM sync_log ORDER BY sync_time DESC, id DESC LIMIT 1",
        )
        .fetch_optional(self.pool.inner())
        .await;
        match row {
            Ok(Some(row)) => Ok(Some(decode_log_entry(&row)?)),
            Ok(None) => Ok(None),
            Err(error) if is_missing_table(&error) => Ok(None),
            Err(error) => Err(map_error(error)),
        }
    }

    async fn upsert_batch(&self, batch: &[CalculationRecord]) -> Result<(), ReplicaStoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::new(
            "INSERT INTO calculations \
             (id, timestamp, name, school, age, address, phone, shape, type, parameters, result) ",
        );
        builder.push_values(batch, |mut row, record| {
            row.push_bind(record.id)
                .push_bind(record.timestamp.naive_utc())
                .push_bind(&record.name)
                .push_bind(&record.school)
                .push_bind(record.age)
                .push_bind(&record.address)
                .push_bind(&record.phone)
                .push_bind(record.shape.as_str())
                .push_bind(record.category.as_str())
                .push_bind(&record.parameters)
                .push_bind(record.result);
        });
        builder.push(
            " ON DUPLICATE KEY UPDATE \
             timestamp = VALUES(timestamp), name = VALUES(name), school = VALUES(school), \
             age = VALUES(age), address = VALUES(address), phone = VALUES(phone), \
             shape = VALUES(shape), type = VALUES(type), parameters = VALUES(parameters), \
             result = VALUES(result)",
        );

        builder
            .build()
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn append_sync_log(
        &self,
        sync_time: DateTime<Utc>,
        records_synced: i32,
        status: SyncStatus,
    ) -> Result<(), ReplicaStoreError> {
        // Failed runs must still be recordable even when the first run died
        // before `ensure_schema` got a chance.
        sqlx::query(CREATE_SYNC_LOG)
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        sqlx::query("INSERT INTO sync_log (sync_time, records_synced, status) VALUES (?, ?, ?)")
            .bind(sync_time.naive_utc())
            .bind(records_synced)
            .bind(status.as_str())
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, ReplicaStoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, MAX(timestamp) AS last_record FROM calculations",
        )
        .fetch_one(self.pool.inner())
        .await;
        let row = match row {
            Ok(row) => row,
            Err(error) if is_missing_table(&error) => return Ok(StoreSnapshot::default()),
            Err(error) => return Err(map_error(error)),
        };

        let total: i64 = row.try_get("total").map_err(map_error)?;
        let last_record: Option<NaiveDateTime> = row.try_get("last_record").map_err(map_error)?;
        Ok(StoreSnapshot {
            total: u64::try_from(total).unwrap_or(0),
            last_record: last_record.map(|ts| ts.and_utc()),
        })
    }
}
