//! Append-only CSV mirror of the primary store.
//!
//! Every accepted submission is appended to a flat file so the data stays
//! inspectable without a database client. Writes go through a blocking task
//! because the `csv` writer is synchronous.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{CsvMirror, CsvMirrorError, CsvMirrorInfo};
use crate::domain::record::CalculationRecord;

const HEADER: [&str; 10] = [
    "timestamp",
    "name",
    "school",
    "age",
    "address",
    "phone",
    "shape",
    "type",
    "parameters",
    "result",
];

/// CSV mirror backed by a single file on the local filesystem.
#[derive(Debug, Clone)]
pub struct CsvFileMirror {
    path: PathBuf,
}

impl CsvFileMirror {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn append_row(path: &Path, record: &CalculationRecord) -> Result<(), CsvMirrorError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|error| CsvMirrorError::new(error.to_string()))?;
        }
    }

    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| CsvMirrorError::new(error.to_string()))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    if is_new {
        writer
            .write_record(HEADER)
            .map_err(|error| CsvMirrorError::new(error.to_string()))?;
    }

    writer
        .write_record([
            record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            record.name.clone(),
            record.school.clone(),
            record.age.map(|age| age.to_string()).unwrap_or_default(),
            record.address.clone(),
            record.phone.clone(),
            record.shape.as_str().to_owned(),
            record.category.as_str().to_owned(),
            record.parameters.to_string(),
            record.result.to_string(),
        ])
        .map_err(|error| CsvMirrorError::new(error.to_string()))?;
    writer
        .flush()
        .map_err(|error| CsvMirrorError::new(error.to_string()))?;
    Ok(())
}

/// Count data rows the way the mirror is written: non-empty lines minus the
/// header. A file that holds only the header has zero rows.
fn count_rows(path: &Path) -> Option<u64> {
    let data = std::fs::read_to_string(path).ok()?;
    if data.trim().is_empty() {
        return Some(0);
    }
    let lines = data.lines().filter(|line| !line.trim().is_empty()).count();
    Some(lines.saturating_sub(1) as u64)
}

fn read_info(path: &Path) -> Result<Option<CsvMirrorInfo>, CsvMirrorError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(CsvMirrorError::new(error.to_string())),
    };
    Ok(Some(CsvMirrorInfo {
        size_bytes: metadata.len(),
        modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        rows: count_rows(path),
    }))
}

fn read_contents(path: &Path) -> Result<Option<Vec<u8>>, CsvMirrorError> {
    match std::fs::read(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(error) => Err(CsvMirrorError::new(error.to_string())),
    }
}

#[async_trait]
impl CsvMirror for CsvFileMirror {
    async fn append(&self, record: &CalculationRecord) -> Result<(), CsvMirrorError> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || append_row(&path, &record))
            .await
            .map_err(|error| CsvMirrorError::new(error.to_string()))?
    }

    async fn info(&self) -> Result<Option<CsvMirrorInfo>, CsvMirrorError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_info(&path))
            .await
            .map_err(|error| CsvMirrorError::new(error.to_string()))?
    }

    async fn export(&self) -> Result<Option<Vec<u8>>, CsvMirrorError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_contents(&path))
            .await
            .map_err(|error| CsvMirrorError::new(error.to_string()))?
    }
}
