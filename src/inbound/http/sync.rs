//! Replication trigger and status handlers.
//!
//! ```text
//! POST /api/v1/sync
//! GET  /api/v1/sync-status
//! ```

use actix_web::{get, post, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{Recommendation, SyncComparison};
use crate::domain::record::{StoreSnapshot, SyncLogEntry, SyncStatus};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Result of a manual sync trigger.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponseBody {
    pub success: bool,
    pub synced_records: u32,
}

/// Count and newest record timestamp for one store.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshotBody {
    pub total: u64,
    #[schema(format = "date-time")]
    pub last_record: Option<String>,
}

impl From<StoreSnapshot> for StoreSnapshotBody {
    fn from(snapshot: StoreSnapshot) -> Self {
        Self {
            total: snapshot.total,
            last_record: snapshot.last_record.map(|ts| ts.to_rfc3339()),
        }
    }
}

/// One sync-log row.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntryBody {
    pub id: i32,
    #[schema(format = "date-time")]
    pub sync_time: String,
    pub records_synced: i32,
    pub status: SyncStatus,
}

impl From<SyncLogEntry> for SyncLogEntryBody {
    fn from(entry: SyncLogEntry) -> Self {
        Self {
            id: entry.id,
            sync_time: entry.sync_time.to_rfc3339(),
            records_synced: entry.records_synced,
            status: entry.status,
        }
    }
}

/// Comparison of primary and replica store state.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusResponseBody {
    pub local: StoreSnapshotBody,
    pub replica: StoreSnapshotBody,
    pub last_sync: Option<SyncLogEntryBody>,
    pub is_configured: bool,
    pub recommendation: Recommendation,
}

impl From<SyncComparison> for SyncStatusResponseBody {
    fn from(comparison: SyncComparison) -> Self {
        Self {
            local: comparison.local.into(),
            replica: comparison.replica.into(),
            last_sync: comparison.last_sync.map(SyncLogEntryBody::from),
            is_configured: comparison.configured,
            recommendation: comparison.recommendation,
        }
    }
}

/// Trigger one replication run. Serialised against the periodic scheduler;
/// a concurrent trigger waits for the in-flight run to finish.
#[utoipa::path(
    post,
    path = "/api/v1/sync",
    responses(
        (status = 200, description = "Replication completed", body = SyncResponseBody),
        (status = 503, description = "Replica unconfigured or unreachable", body = crate::domain::Error),
        (status = 500, description = "Replication failed", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "runSync"
)]
#[post("/sync")]
pub async fn run_sync(state: web::Data<HttpState>) -> ApiResult<web::Json<SyncResponseBody>> {
    let report = state.sync.run_sync().await?;
    Ok(web::Json(SyncResponseBody {
        success: true,
        synced_records: report.records_synced,
    }))
}

/// Compare primary and replica state and recommend the next step.
#[utoipa::path(
    get,
    path = "/api/v1/sync-status",
    responses(
        (status = 200, description = "Replication status", body = SyncStatusResponseBody),
        (status = 503, description = "Primary store unavailable", body = crate::domain::Error)
    ),
    tags = ["sync"],
    operation_id = "getSyncStatus"
)]
#[get("/sync-status")]
pub async fn sync_status(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<SyncStatusResponseBody>> {
    let comparison = state.sync_query.sync_status().await?;
    Ok(web::Json(SyncStatusResponseBody::from(comparison)))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
