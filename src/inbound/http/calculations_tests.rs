//! Handler tests for calculation submission.

use std::sync::Arc;

use actix_web::{test, web, App};
use chrono::{TimeZone, Utc};

use super::*;
use crate::domain::ports::{
    MockCsvQuery, MockDashboardQuery, MockSubmissionCommand, MockSyncCommand, MockSyncQuery,
};
use crate::domain::record::NewCalculation;
use crate::domain::{Error, Shape};

fn state_with_submissions(submissions: MockSubmissionCommand) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        Arc::new(submissions),
        Arc::new(MockDashboardQuery::new()),
        Arc::new(MockSyncCommand::new()),
        Arc::new(MockSyncQuery::new()),
        Arc::new(MockCsvQuery::new()),
    ))
}

fn persisted_square() -> CalculationRecord {
    CalculationRecord::from_new(
        42,
        NewCalculation {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
            name: "Ani".to_owned(),
            school: "SDN 4".to_owned(),
            age: Some(11),
            address: String::new(),
            phone: String::new(),
            shape: Shape::Square,
            category: Shape::Square.category(),
            parameters: serde_json::json!({ "s": "4" }),
            result: 16.0,
        },
    )
}

#[actix_web::test]
async fn valid_submission_returns_the_persisted_record() {
    let mut submissions = MockSubmissionCommand::new();
    submissions.expect_submit().times(1).returning(|request| {
        assert_eq!(request.shape, "square");
        assert_eq!(request.parameters.get("s").map(String::as_str), Some("4"));
        Ok(persisted_square())
    });

    let app = test::init_service(
        App::new()
            .app_data(state_with_submissions(submissions))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/api/v1/calculations")
        .set_json(serde_json::json!({
            "name": "Ani",
            "school": "SDN 4",
            "age": 11,
            "shape": "square",
            "s": "4"
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    assert_eq!(body["id"], 42);
    assert_eq!(body["shape"], "square");
    assert_eq!(body["category"], "area");
    assert_eq!(body["result"], 16.0);
}

#[actix_web::test]
async fn invalid_parameters_return_400_with_the_error_envelope() {
    let mut submissions = MockSubmissionCommand::new();
    submissions
        .expect_submit()
        .times(1)
        .returning(|_| Err(Error::invalid_request("missing parameter: s")));

    let app = test::init_service(
        App::new()
            .app_data(state_with_submissions(submissions))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/api/v1/calculations")
        .set_json(serde_json::json!({ "shape": "square" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn store_outage_returns_503() {
    let mut submissions = MockSubmissionCommand::new();
    submissions
        .expect_submit()
        .times(1)
        .returning(|_| Err(Error::service_unavailable("record store unavailable")));

    let app = test::init_service(
        App::new()
            .app_data(state_with_submissions(submissions))
            .configure(crate::inbound::http::configure_api),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/api/v1/calculations")
        .set_json(serde_json::json!({ "shape": "square", "s": "4" }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(
        response.status(),
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE
    );
}
