//! Dashboard aggregates handler.
//!
//! ```text
//! GET /api/v1/dashboard?sort=timestamp&order=desc
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::DashboardData;
use crate::domain::stats::{CategoryBreakdown, RecentSort, ShapeStat, SortOrder};
use crate::inbound::http::calculations::CalculationResponseBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Sorting parameters for the recent-records table. Unknown values fall back
/// to the defaults rather than erroring.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct DashboardParams {
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponseBody {
    pub totals: u64,
    pub stats: Vec<ShapeStat>,
    pub last: Vec<CalculationResponseBody>,
    pub categories: CategoryBreakdown,
}

impl From<DashboardData> for DashboardResponseBody {
    fn from(data: DashboardData) -> Self {
        Self {
            totals: data.totals,
            stats: data.stats,
            last: data
                .last
                .into_iter()
                .map(CalculationResponseBody::from)
                .collect(),
            categories: data.categories,
        }
    }
}

/// Aggregate statistics over the primary store. Degrades to zero-valued
/// placeholders when the store is unreachable.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    params(DashboardParams),
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardResponseBody),
        (status = 500, description = "Aggregate query failed", body = crate::domain::Error)
    ),
    tags = ["dashboard"],
    operation_id = "getDashboard"
)]
#[get("/dashboard")]
pub async fn get_dashboard(
    state: web::Data<HttpState>,
    params: web::Query<DashboardParams>,
) -> ApiResult<web::Json<DashboardResponseBody>> {
    let sort = RecentSort::parse(params.sort.as_deref());
    let order = SortOrder::parse(params.order.as_deref());

    let data = state.dashboard.dashboard(sort, order).await?;
    Ok(web::Json(DashboardResponseBody::from(data)))
}
