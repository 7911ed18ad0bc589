//! MySQL-backed [`RecordStore`] adapter for the primary `calculations` table.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::Row;
use tracing::warn;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::record::{CalculationRecord, NewCalculation, StoreSnapshot};
use crate::domain::shape::{Category, Shape};
use crate::domain::stats::{RecentSort, ShapeStat, SortOrder};

use super::pool::DbPool;
use super::support::{decode_record, is_connection_error};

const CREATE_CALCULATIONS: &str = "\
CREATE TABLE IF NOT EXISTS calculations (
  id INT AUTO_INCREMENT PRIMARY KEY,
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

const INSERT_CALCULATION: &str = "\
INSERT INTO calculations (timestamp, name, school, age, address, phone, shape, type, parameters, result)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// sqlx implementation of the primary store port.
#[derive(Clone)]
pub struct MySqlRecordStore {
    pool: DbPool,
}

impl MySqlRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: sqlx::Error) -> RecordStoreError {
    if is_connection_error(&error) {
        RecordStoreError::connection(error.to_string())
    } else {
        RecordStoreError::query(error.to_string())
    }
}

#[async_trait]
impl RecordStore for MySqlRecordStore {
    async fn ensure_schema(&self) -> Result<(), RecordStoreError> {
        sqlx::query(CREATE_CALCULATIONS)
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn insert(
        &self,
        record: &NewCalculation,
    ) -> Result<CalculationRecord, RecordStoreError> {
        let outcome = sqlx::query(INSERT_CALCULATION)
            .bind(record.timestamp.naive_utc())
            .bind(&record.name)
            .bind(&record.school)
            .bind(record.age)
            .bind(&record.address)
            .bind(&record.phone)
            .bind(record.shape.as_str())
            .bind(record.category.as_str())
            .bind(&record.parameters)
            .bind(record.result)
            .execute(self.pool.inner())
            .await
            .map_err(map_error)?;

        let id = i32::try_from(outcome.last_insert_id())
            .map_err(|_| RecordStoreError::query("assigned id exceeds the INT key range"))?;
        Ok(CalculationRecord::from_new(id, record.clone()))
    }

    async fn snapshot(&self) -> Result<StoreSnapshot, RecordStoreError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total, MAX(timestamp) AS last_record FROM calculations",
        )
        .fetch_one(self.pool.inner())
        .await
        .map_err(map_error)?;

        let total: i64 = row.try_get("total").map_err(map_error)?;
        let last_record: Option<NaiveDateTime> = row.try_get("last_record").map_err(map_error)?;
        Ok(StoreSnapshot {
            total: u64::try_from(total).unwrap_or(0),
            last_record: last_record.map(|ts| ts.and_utc()),
        })
    }

    async fn records_after(
        &self,
        watermark: DateTime<Utc>,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError> {
        let rows = sqlx::query(
            "SELECT id, timestamp, name, school, age, address, phone, shape, type, parameters, result
             FROM calculations WHERE timestamp > ? ORDER BY timestamp ASC",
        )
        .bind(watermark.naive_utc())
        .fetch_all(self.pool.inner())
        .await
        .map_err(map_error)?;

        rows.iter()
            .map(|row| decode_record(row).map_err(RecordStoreError::query))
            .collect()
    }

    async fn shape_stats(&self) -> Result<Vec<ShapeStat>, RecordStoreError> {
        let rows = sqlx::query(
            "SELECT shape, type, COUNT(*) AS cnt, AVG(result) AS avg_result,
                    MIN(result) AS min_result, MAX(result) AS max_result
             FROM calculations GROUP BY shape, type",
        )
        .fetch_all(self.pool.inner())
        .await
        .map_err(map_error)?;

        let mut stats = Vec::with_capacity(rows.len());
        for row in &rows {
            let shape_name: String = row.try_get("shape").map_err(map_error)?;
            let Ok(shape) = shape_name.parse::<Shape>() else {
                // Rows predating the current shape set are not worth failing
                // the whole dashboard over.
                warn!(shape = %shape_name, "skipping stats row with unknown shape");
                continue;
            };
            let category_name: String = row.try_get("type").map_err(map_error)?;
            let category = category_name
                .parse::<Category>()
                .unwrap_or_else(|_| shape.category());
            let count: i64 = row.try_get("cnt").map_err(map_error)?;

            stats.push(ShapeStat {
                shape,
                category,
                count: u64::try_from(count).unwrap_or(0),
                avg_result: row
                    .try_get::<Option<f64>, _>("avg_result")
                    .map_err(map_error)?
                    .unwrap_or(0.0),
                min_result: row
                    .try_get::<Option<f64>, _>("min_result")
                    .map_err(map_error)?
                    .unwrap_or(0.0),
                max_result: row
                    .try_get::<Option<f64>, _>("max_result")
                    .map_err(map_error)?
                    .unwrap_or(0.0),
            });
        }
        Ok(stats)
    }

    async fn recent(
        &self,
        sort: RecentSort,
        order: SortOrder,
        limit: u32,
    ) -> Result<Vec<CalculationRecord>, RecordStoreError> {
        // Column and direction come from fixed allow-lists, never raw input.
        let sql = format!(
            "SELECT id, timestamp, name, school, age, address, phone, shape, type, parameters, result
             FROM calculations ORDER BY {} {} LIMIT ?",
            sort.column(),
            order.keyword()
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool.inner())
            .await
            .map_err(map_error)?;

        rows.iter()
            .map(|row| decode_record(row).map_err(RecordStoreError::query))
            .collect()
    }
}
