//! Domain ports: outbound adapters the services depend on, and the driving
//! use-cases the HTTP layer consumes.

mod csv_mirror;
mod driving;
mod record_store;
mod replica_store;

pub use csv_mirror::{CsvMirror, CsvMirrorError, CsvMirrorInfo};
pub use driving::{
    CsvQuery, DashboardData, DashboardQuery, Recommendation, SubmissionCommand,
    SubmissionRequest, SyncCommand, SyncComparison, SyncQuery, SyncReport,
};
pub use record_store::{RecordStore, RecordStoreError};
pub use replica_store::{ReplicaStore, ReplicaStoreError};

#[cfg(test)]
pub use csv_mirror::MockCsvMirror;
#[cfg(test)]
pub use driving::{
    MockCsvQuery, MockDashboardQuery, MockSubmissionCommand, MockSyncCommand, MockSyncQuery,
};
#[cfg(test)]
pub use record_store::MockRecordStore;
#[cfg(test)]
pub use replica_store::MockReplicaStore;
