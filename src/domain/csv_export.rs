//! Read-side of the CSV mirror: file metadata and downloads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::ports::{CsvMirror, CsvMirrorInfo, CsvQuery};

/// Implements [`CsvQuery`] over the mirror port. A missing file is a normal
/// state (nothing submitted yet), not an error.
pub struct CsvExportService {
    mirror: Arc<dyn CsvMirror>,
}

impl CsvExportService {
    pub fn new(mirror: Arc<dyn CsvMirror>) -> Self {
        Self { mirror }
    }
}

#[async_trait]
impl CsvQuery for CsvExportService {
    async fn info(&self) -> Result<Option<CsvMirrorInfo>, Error> {
        self.mirror
            .info()
            .await
            .map_err(|err| Error::internal(format!("csv mirror error: {err}")))
    }

    async fn export(&self) -> Result<Option<Vec<u8>>, Error> {
        self.mirror
            .export()
            .await
            .map_err(|err| Error::internal(format!("csv mirror error: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CsvMirrorError, MockCsvMirror};
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn info_passes_through_the_mirror_metadata() {
        let mut mirror = MockCsvMirror::new();
        mirror.expect_info().times(1).returning(|| {
            Ok(Some(CsvMirrorInfo {
                size_bytes: 120,
                modified: None,
                rows: Some(2),
            }))
        });

        let service = CsvExportService::new(Arc::new(mirror));
        let info = service.info().await.unwrap().unwrap();

        assert_eq!(info.size_bytes, 120);
        assert_eq!(info.rows, Some(2));
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let mut mirror = MockCsvMirror::new();
        mirror.expect_export().times(1).returning(|| Ok(None));

        let service = CsvExportService::new(Arc::new(mirror));

        assert!(service.export().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mirror_failures_surface_as_internal_errors() {
        let mut mirror = MockCsvMirror::new();
        mirror
            .expect_info()
            .times(1)
            .returning(|| Err(CsvMirrorError::new("permission denied")));

        let service = CsvExportService::new(Arc::new(mirror));
        let err = service.info().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
