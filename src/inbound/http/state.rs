//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain's driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CsvQuery, DashboardQuery, SubmissionCommand, SyncCommand, SyncQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub submissions: Arc<dyn SubmissionCommand>,
    pub dashboard: Arc<dyn DashboardQuery>,
    pub sync: Arc<dyn SyncCommand>,
    pub sync_query: Arc<dyn SyncQuery>,
    pub csv: Arc<dyn CsvQuery>,
}

impl HttpState {
    pub fn new(
        submissions: Arc<dyn SubmissionCommand>,
        dashboard: Arc<dyn DashboardQuery>,
        sync: Arc<dyn SyncCommand>,
        sync_query: Arc<dyn SyncQuery>,
        csv: Arc<dyn CsvQuery>,
    ) -> Self {
        Self {
            submissions,
            dashboard,
            sync,
            sync_query,
            csv,
        }
    }
}
