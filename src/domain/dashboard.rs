//! Dashboard query service.
//!
//! When the primary store is unreachable the dashboard degrades to a
//! zero-valued placeholder rather than failing the page; query-level
//! failures still surface as errors.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ports::{DashboardData, DashboardQuery, RecordStore, RecordStoreError};
use crate::domain::stats::{category_breakdown, RecentSort, SortOrder};

const RECENT_LIMIT: u32 = 20;

/// Implements [`DashboardQuery`] over the primary store.
pub struct DashboardService {
    records: Arc<dyn RecordStore>,
}

impl DashboardService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    fn placeholder() -> DashboardData {
        DashboardData {
            totals: 0,
            stats: Vec::new(),
            last: Vec::new(),
            categories: category_breakdown(&[]),
        }
    }
}

enum Degraded<T> {
    Value(T),
    Placeholder,
}

fn degrade<T>(result: Result<T, RecordStoreError>) -> Result<Degraded<T>, Error> {
    match result {
        Ok(value) => Ok(Degraded::Value(value)),
        Err(RecordStoreError::Connection { message }) => {
            warn!(error = %message, "dashboard degrading to placeholder, record store unreachable");
            Ok(Degraded::Placeholder)
        }
        Err(RecordStoreError::Query { message }) => {
            Err(Error::internal(format!("record store error: {message}")))
        }
    }
}

#[async_trait]
impl DashboardQuery for DashboardService {
    async fn dashboard(&self, sort: RecentSort, order: SortOrder) -> Result<DashboardData, Error> {
        let snapshot = match degrade(self.records.snapshot().await)? {
            Degraded::Value(snapshot) => snapshot,
            Degraded::Placeholder => return Ok(Self::placeholder()),
        };
        let stats = match degrade(self.records.shape_stats().await)? {
            Degraded::Value(stats) => stats,
            Degraded::Placeholder => return Ok(Self::placeholder()),
        };
        let last = match degrade(self.records.recent(sort, order, RECENT_LIMIT).await)? {
            Degraded::Value(last) => last,
            Degraded::Placeholder => return Ok(Self::placeholder()),
        };

        let categories = category_breakdown(&stats);
        Ok(DashboardData {
            totals: snapshot.total,
            stats,
            last,
            categories,
        })
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
