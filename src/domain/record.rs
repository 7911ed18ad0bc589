//! Calculation records and sync-log entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::shape::{Category, Shape};

/// A submission that has not been assigned an id by the primary store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalculation {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub school: String,
    pub age: Option<i32>,
    pub address: String,
    pub phone: String,
    pub shape: Shape,
    pub category: Category,
    pub parameters: serde_json::Value,
    pub result: f64,
}

/// One persisted calculation. Created once at submission time and never
/// mutated; replication upserts copies into the replica store keyed by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRecord {
    pub id: i32,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub school: String,
    pub age: Option<i32>,
    pub address: String,
    pub phone: String,
    pub shape: Shape,
    pub category: Category,
    pub parameters: serde_json::Value,
    pub result: f64,
}

impl CalculationRecord {
    /// Attach a store-assigned id to a new submission.
    pub fn from_new(id: i32, new: NewCalculation) -> Self {
        Self {
            id,
            timestamp: new.timestamp,
            name: new.name,
            school: new.school,
            age: new.age,
            address: new.address,
            phone: new.phone,
            shape: new.shape,
            category: new.category,
            parameters: new.parameters,
            result: new.result,
        }
    }
}

/// Aggregate view of one store: row count and the newest record timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreSnapshot {
    pub total: u64,
    pub last_record: Option<DateTime<Utc>>,
}

/// Outcome of one replication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(SyncStatus::Success),
            "failed" => Ok(SyncStatus::Failed),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// One row of the append-only sync log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLogEntry {
    pub id: i32,
    pub sync_time: DateTime<Utc>,
    pub records_synced: i32,
    pub status: SyncStatus,
}
