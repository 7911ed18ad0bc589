//! Handler tests for the CSV mirror endpoints.

use std::sync::Arc;

use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::ports::{
    CsvMirrorInfo, MockCsvQuery, MockDashboardQuery, MockSubmissionCommand, MockSyncCommand,
    MockSyncQuery,
};

fn state(csv: MockCsvQuery) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(MockSubmissionCommand::new()),
        Arc::new(MockDashboardQuery::new()),
        Arc::new(MockSyncCommand::new()),
        Arc::new(MockSyncQuery::new()),
        Arc::new(csv),
    ))
}

#[actix_web::test]
async fn info_reports_a_missing_mirror() {
    let mut csv = MockCsvQuery::new();
    csv.expect_info().times(1).returning(|| Ok(None));

    let app = test::init_service(
        App::new()
            .app_data(state(csv))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::get().uri("/api/v1/csv/info").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body, serde_json::json!({ "exists": false }));
}

#[actix_web::test]
async fn info_reports_size_mtime_and_rows() {
    let mut csv = MockCsvQuery::new();
    csv.expect_info().times(1).returning(|| {
        Ok(Some(CsvMirrorInfo {
            size_bytes: 230,
            modified: Some(Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()),
            rows: Some(2),
        }))
    });

    let app = test::init_service(
        App::new()
            .app_data(state(csv))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::get().uri("/api/v1/csv/info").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["exists"], true);
    assert_eq!(body["size"], 230);
    assert_eq!(body["rows"], 2);
    assert_eq!(body["mtime"], "2026-03-14T09:30:00+00:00");
}

#[actix_web::test]
async fn download_is_404_before_the_first_mirror_write() {
    let mut csv = MockCsvQuery::new();
    csv.expect_export().times(1).returning(|| Ok(None));

    let app = test::init_service(
        App::new()
            .app_data(state(csv))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/api/v1/csv/download")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn download_serves_the_file_as_an_attachment() {
    let mut csv = MockCsvQuery::new();
    csv.expect_export()
        .times(1)
        .returning(|| Ok(Some(b"timestamp,name\n2026-03-14 09:26:53,Ani\n".to_vec())));

    let app = test::init_service(
        App::new()
            .app_data(state(csv))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/api/v1/csv/download")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), actix_web::http::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(actix_web::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    assert_eq!(
        response
            .headers()
            .get(actix_web::http::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok()),
        Some("attachment; filename=\"records.csv\"")
    );

    let body = test::read_body(response).await;
    assert!(body.starts_with(b"timestamp,name"));
}
