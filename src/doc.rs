//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API: the calculation, dashboard, and sync
//! endpoints plus the health probes. The generated document is served at
//! `/api-docs/openapi.json` in debug builds.

use utoipa::OpenApi;

use crate::domain::record::SyncStatus;
use crate::domain::shape::{Category, Shape};
use crate::domain::stats::{CategoryBreakdown, ShapeShare, ShapeStat};
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::calculations::{CalculationResponseBody, CreateCalculationRequestBody};
use crate::inbound::http::csv::CsvInfoResponseBody;
use crate::inbound::http::dashboard::DashboardResponseBody;
use crate::inbound::http::sync::{
    StoreSnapshotBody, SyncLogEntryBody, SyncResponseBody, SyncStatusResponseBody,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Figura API",
        description = "Shape calculations, dashboard aggregates, and primary-to-replica synchronisation."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::calculations::create_calculation,
        crate::inbound::http::dashboard::get_dashboard,
        crate::inbound::http::sync::run_sync,
        crate::inbound::http::sync::sync_status,
        crate::inbound::http::csv::csv_info,
        crate::inbound::http::csv::download_csv,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CreateCalculationRequestBody,
        CalculationResponseBody,
        DashboardResponseBody,
        SyncResponseBody,
        SyncStatusResponseBody,
        CsvInfoResponseBody,
        StoreSnapshotBody,
        SyncLogEntryBody,
        SyncStatus,
        Shape,
        Category,
        ShapeStat,
        ShapeShare,
        CategoryBreakdown,
        Error,
        ErrorCode
    )),
    tags(
        (name = "calculations", description = "Shape calculation submissions"),
        (name = "dashboard", description = "Aggregate statistics"),
        (name = "sync", description = "Primary-to-replica synchronisation"),
        (name = "csv", description = "CSV mirror metadata and download"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
