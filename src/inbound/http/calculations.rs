//! Calculation submission handler.
//!
//! ```text
//! POST /api/v1/calculations
//! ```

use std::collections::HashMap;

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SubmissionRequest;
use crate::domain::CalculationRecord;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for submitting a calculation. The shape parameters keep
/// the short form-field names (`s`, `a`, `t`, `r`, `h`); only the ones the
/// chosen shape needs are required.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalculationRequestBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub school: String,
    pub age: Option<i32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    pub shape: String,
    pub s: Option<String>,
    pub a: Option<String>,
    pub t: Option<String>,
    pub r: Option<String>,
    pub h: Option<String>,
}

impl CreateCalculationRequestBody {
    fn into_request(self) -> SubmissionRequest {
        let mut parameters = HashMap::new();
        for (key, value) in [
            ("s", self.s),
            ("a", self.a),
            ("t", self.t),
            ("r", self.r),
            ("h", self.h),
        ] {
            if let Some(value) = value {
                parameters.insert(key.to_owned(), value);
            }
        }
        SubmissionRequest {
            name: self.name,
            school: self.school,
            age: self.age,
            address: self.address,
            phone: self.phone,
            shape: self.shape,
            parameters,
        }
    }
}

/// One persisted calculation as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResponseBody {
    pub id: i32,
    #[schema(format = "date-time")]
    pub timestamp: String,
    pub name: String,
    pub school: String,
    pub age: Option<i32>,
    pub address: String,
    pub phone: String,
    pub shape: String,
    pub category: String,
    pub parameters: serde_json::Value,
    pub result: f64,
}

impl From<CalculationRecord> for CalculationResponseBody {
    fn from(record: CalculationRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp.to_rfc3339(),
            name: record.name,
            school: record.school,
            age: record.age,
            address: record.address,
            phone: record.phone,
            shape: record.shape.to_string(),
            category: record.category.to_string(),
            parameters: record.parameters,
            result: record.result,
        }
    }
}

/// Submit one calculation: validate, compute, persist, mirror to CSV.
#[utoipa::path(
    post,
    path = "/api/v1/calculations",
    request_body = CreateCalculationRequestBody,
    responses(
        (status = 200, description = "Calculation persisted", body = CalculationResponseBody),
        (status = 400, description = "Invalid shape or parameters", body = crate::domain::Error),
        (status = 503, description = "Record store unavailable", body = crate::domain::Error)
    ),
    tags = ["calculations"],
    operation_id = "createCalculation"
)]
#[post("/calculations")]
pub async fn create_calculation(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCalculationRequestBody>,
) -> ApiResult<web::Json<CalculationResponseBody>> {
    let record = state
        .submissions
        .submit(payload.into_inner().into_request())
        .await?;
    Ok(web::Json(CalculationResponseBody::from(record)))
}

#[cfg(test)]
#[path = "calculations_tests.rs"]
mod tests;
