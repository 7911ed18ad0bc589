//! CSV mirror handlers: file metadata and download.
//!
//! ```text
//! GET /api/v1/csv/info
//! GET /api/v1/csv/download
//! ```

use actix_web::http::header;
use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::CsvMirrorInfo;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

const DOWNLOAD_NAME: &str = "records.csv";

/// Mirror file metadata. All fields except `exists` are absent when no file
/// has been written yet.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfoResponseBody {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[schema(format = "date-time")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
}

impl CsvInfoResponseBody {
    fn absent() -> Self {
        Self {
            exists: false,
            size: None,
            mtime: None,
            rows: None,
        }
    }
}

impl From<CsvMirrorInfo> for CsvInfoResponseBody {
    fn from(info: CsvMirrorInfo) -> Self {
        Self {
            exists: true,
            size: Some(info.size_bytes),
            mtime: info.modified.map(|ts| ts.to_rfc3339()),
            rows: info.rows,
        }
    }
}

/// Mirror file metadata: existence, size, modification time, row count.
#[utoipa::path(
    get,
    path = "/api/v1/csv/info",
    responses(
        (status = 200, description = "Mirror file metadata", body = CsvInfoResponseBody),
        (status = 500, description = "Mirror file unreadable", body = crate::domain::Error)
    ),
    tags = ["csv"],
    operation_id = "getCsvInfo"
)]
#[get("/csv/info")]
pub async fn csv_info(state: web::Data<HttpState>) -> ApiResult<web::Json<CsvInfoResponseBody>> {
    let body = match state.csv.info().await? {
        Some(info) => CsvInfoResponseBody::from(info),
        None => CsvInfoResponseBody::absent(),
    };
    Ok(web::Json(body))
}

/// Download the mirror file. 404 until the first submission is mirrored.
#[utoipa::path(
    get,
    path = "/api/v1/csv/download",
    responses(
        (status = 200, description = "The mirror file", body = String, content_type = "text/csv"),
        (status = 404, description = "No mirror file yet", body = crate::domain::Error),
        (status = 500, description = "Mirror file unreadable", body = crate::domain::Error)
    ),
    tags = ["csv"],
    operation_id = "downloadCsv"
)]
#[get("/csv/download")]
pub async fn download_csv(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let contents = state
        .csv
        .export()
        .await?
        .ok_or_else(|| Error::not_found("no records have been mirrored yet"))?;

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
        ))
        .body(contents))
}

#[cfg(test)]
#[path = "csv_tests.rs"]
mod tests;
