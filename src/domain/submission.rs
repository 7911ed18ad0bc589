//! Submission service: validate, compute, persist, mirror.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SubsecRound;
use mockable::Clock;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ports::{
    CsvMirror, RecordStore, RecordStoreError, SubmissionCommand, SubmissionRequest,
};
use crate::domain::record::NewCalculation;
use crate::domain::shape::{Shape, ShapeParams};

fn map_store_error(error: RecordStoreError) -> Error {
    match error {
        RecordStoreError::Connection { message } => {
            Error::service_unavailable(format!("record store unavailable: {message}"))
        }
        RecordStoreError::Query { message } => {
            Error::internal(format!("record store error: {message}"))
        }
    }
}

/// Implements [`SubmissionCommand`] over the primary store and the CSV
/// mirror. A mirror failure is logged and does not fail the submission; a
/// rejected submission persists nothing.
pub struct SubmissionService {
    records: Arc<dyn RecordStore>,
    mirror: Arc<dyn CsvMirror>,
    clock: Arc<dyn Clock>,
}

impl SubmissionService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        mirror: Arc<dyn CsvMirror>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            records,
            mirror,
            clock,
        }
    }
}

#[async_trait]
impl SubmissionCommand for SubmissionService {
    async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<crate::domain::record::CalculationRecord, Error> {
        let shape: Shape = request
            .shape
            .parse()
            .map_err(|err| Error::invalid_request(format!("{err}")))?;
        let params = ShapeParams::from_raw(shape, &request.parameters)
            .map_err(|err| Error::invalid_request(format!("{err}")))?;
        let computation = params.compute();

        // Stored timestamps carry second precision, matching the DATETIME
        // column and the watermark comparisons built on it.
        let timestamp = self.clock.utc().trunc_subsecs(0);

        let new = NewCalculation {
            timestamp,
            name: request.name,
            school: request.school,
            age: request.age,
            address: request.address,
            phone: request.phone,
            shape,
            category: computation.category,
            parameters: params.to_json(),
            result: computation.result,
        };

        let record = self.records.insert(&new).await.map_err(map_store_error)?;

        if let Err(err) = self.mirror.append(&record).await {
            warn!(error = %err, id = record.id, "csv mirror append failed");
        }

        Ok(record)
    }
}

#[cfg(test)]
#[path = "submission_tests.rs"]
mod tests;
