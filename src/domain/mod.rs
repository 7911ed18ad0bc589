//! Domain types and services, independent of HTTP and SQL concerns.

pub mod csv_export;
pub mod dashboard;
pub mod error;
pub mod ports;
pub mod record;
pub mod replication;
pub mod shape;
pub mod stats;
pub mod submission;

pub use csv_export::CsvExportService;
pub use dashboard::DashboardService;
pub use error::{Error, ErrorCode};
pub use record::{CalculationRecord, NewCalculation, StoreSnapshot, SyncLogEntry, SyncStatus};
pub use replication::{Replicator, UnconfiguredSync, DEFAULT_BATCH_SIZE};
pub use shape::{Category, Computation, InvalidParameters, Shape, ShapeParams};
pub use submission::SubmissionService;
