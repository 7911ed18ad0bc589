//! Driving ports: the use-cases HTTP handlers depend on.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::error::Error;
use crate::domain::ports::csv_mirror::CsvMirrorInfo;
use crate::domain::record::{CalculationRecord, StoreSnapshot, SyncLogEntry};
use crate::domain::stats::{CategoryBreakdown, RecentSort, ShapeStat, SortOrder};

/// Raw form submission as received by the inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRequest {
    pub name: String,
    pub school: String,
    pub age: Option<i32>,
    pub address: String,
    pub phone: String,
    pub shape: String,
    /// Raw shape parameters keyed `s`, `a`, `t`, `r`, `h`.
    pub parameters: HashMap<String, String>,
}

/// Validate, compute, and persist one submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionCommand: Send + Sync {
    async fn submit(&self, request: SubmissionRequest) -> Result<CalculationRecord, Error>;
}

/// Aggregates backing the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub totals: u64,
    pub stats: Vec<ShapeStat>,
    pub last: Vec<CalculationRecord>,
    pub categories: CategoryBreakdown,
}

/// Read-only dashboard aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    async fn dashboard(&self, sort: RecentSort, order: SortOrder) -> Result<DashboardData, Error>;
}

/// Result of one completed replication run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub records_synced: u32,
}

/// Trigger one replication run.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncCommand: Send + Sync {
    async fn run_sync(&self) -> Result<SyncReport, Error>;
}

/// Next step derived purely from the two store counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// No replica credentials are configured.
    ConfigureReplica,
    /// The replica is behind the primary; run a sync.
    RunSync,
    /// The replica holds more rows than the primary.
    OutOfSync,
    /// Counts match.
    InSync,
}

impl Recommendation {
    /// Derive the recommendation from store counts alone.
    pub fn from_counts(configured: bool, local_total: u64, replica_total: u64) -> Self {
        if !configured {
            Recommendation::ConfigureReplica
        } else if replica_total < local_total {
            Recommendation::RunSync
        } else if replica_total > local_total {
            Recommendation::OutOfSync
        } else {
            Recommendation::InSync
        }
    }
}

/// Comparison of primary and replica store state.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncComparison {
    pub local: StoreSnapshot,
    pub replica: StoreSnapshot,
    pub last_sync: Option<SyncLogEntry>,
    pub configured: bool,
    pub recommendation: Recommendation,
}

/// Read-only replication status.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncQuery: Send + Sync {
    async fn sync_status(&self) -> Result<SyncComparison, Error>;
}

/// Read-only access to the CSV mirror file.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CsvQuery: Send + Sync {
    /// Mirror file metadata, or `None` when nothing has been mirrored yet.
    async fn info(&self) -> Result<Option<CsvMirrorInfo>, Error>;

    /// The full mirror file, or `None` when nothing has been mirrored yet.
    async fn export(&self) -> Result<Option<Vec<u8>>, Error>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Recommendation;

    #[rstest]
    #[case(false, 10, 0, Recommendation::ConfigureReplica)]
    #[case(false, 0, 0, Recommendation::ConfigureReplica)]
    #[case(true, 10, 4, Recommendation::RunSync)]
    #[case(true, 4, 10, Recommendation::OutOfSync)]
    #[case(true, 10, 10, Recommendation::InSync)]
    #[case(true, 0, 0, Recommendation::InSync)]
    fn recommendation_is_a_pure_function_of_the_counts(
        #[case] configured: bool,
        #[case] local: u64,
        #[case] replica: u64,
        #[case] expected: Recommendation,
    ) {
        assert_eq!(
            Recommendation::from_counts(configured, local, replica),
            expected
        );
    }
}
