//! Handler tests for the sync trigger and status endpoints.

use std::sync::Arc;

use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::ports::{
    MockCsvQuery, MockDashboardQuery, MockSubmissionCommand, MockSyncCommand, MockSyncQuery,
    Recommendation, SyncReport,
};
use crate::domain::Error;

fn state(sync: MockSyncCommand, sync_query: MockSyncQuery) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(MockSubmissionCommand::new()),
        Arc::new(MockDashboardQuery::new()),
        Arc::new(sync),
        Arc::new(sync_query),
        Arc::new(MockCsvQuery::new()),
    ))
}

#[actix_web::test]
async fn manual_sync_reports_the_synced_count() {
    let mut sync = MockSyncCommand::new();
    sync.expect_run_sync()
        .times(1)
        .returning(|| Ok(SyncReport { records_synced: 150 }));

    let app = test::init_service(
        App::new()
            .app_data(state(sync, MockSyncQuery::new()))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::post().uri("/api/v1/sync").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["syncedRecords"], 150);
}

#[actix_web::test]
async fn unconfigured_replica_returns_503() {
    let mut sync = MockSyncCommand::new();
    sync.expect_run_sync()
        .times(1)
        .returning(|| Err(Error::service_unavailable("replica store is not configured")));

    let app = test::init_service(
        App::new()
            .app_data(state(sync, MockSyncQuery::new()))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::post().uri("/api/v1/sync").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(
        response.status(),
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    );
}

#[actix_web::test]
async fn sync_status_serialises_the_comparison() {
    let mut sync_query = MockSyncQuery::new();
    sync_query.expect_sync_status().times(1).returning(|| {
        Ok(SyncComparison {
            local: StoreSnapshot {
                total: 10,
                last_record: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            },
            replica: StoreSnapshot {
                total: 4,
                last_record: None,
            },
            last_sync: Some(SyncLogEntry {
                id: 3,
                sync_time: Utc.with_ymd_and_hms(2026, 1, 2, 3, 0, 0).unwrap(),
                records_synced: 4,
                status: SyncStatus::Success,
            }),
            configured: true,
            recommendation: Recommendation::RunSync,
        })
    });

    let app = test::init_service(
        App::new()
            .app_data(state(MockSyncCommand::new(), sync_query))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/api/v1/sync-status")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["local"]["total"], 10);
    assert_eq!(body["replica"]["total"], 4);
    assert_eq!(body["isConfigured"], true);
    assert_eq!(body["recommendation"], "run_sync");
    assert_eq!(body["lastSync"]["recordsSynced"], 4);
    assert_eq!(body["lastSync"]["status"], "success");
}
