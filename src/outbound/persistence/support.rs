//! Shared row decoding and error classification for the MySQL adapters.

use chrono::NaiveDateTime;
use sqlx::mysql::MySqlRow;
use sqlx::Row;

use crate::domain::record::CalculationRecord;
use crate::domain::shape::{Category, Shape};

/// True for connection-class failures: the pool, the socket, or TLS, plus
/// SQLSTATE class 08 (connection exceptions) from the server.
pub(super) fn is_connection_error(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db) => db
            .code()
            .map(|code| code.starts_with("08"))
            .unwrap_or(false),
        _ => false,
    }
}

/// True when the statement failed because its table does not exist
/// (SQLSTATE 42S02). The replica adapters treat this as "not created yet".
pub(super) fn is_missing_table(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(db) if db.code().as_deref() == Some("42S02")
    )
}

/// Decode one `calculations` row into the domain record.
pub(super) fn decode_record(row: &MySqlRow) -> Result<CalculationRecord, String> {
    let shape_name: String = row.try_get("shape").map_err(|e| e.to_string())?;
    let shape: Shape = shape_name
        .parse()
        .map_err(|e: crate::domain::shape::InvalidParameters| e.to_string())?;
    let category_name: String = row.try_get("type").map_err(|e| e.to_string())?;
    let category: Category = category_name.parse()?;
    let timestamp: NaiveDateTime = row.try_get("timestamp").map_err(|e| e.to_string())?;

    Ok(CalculationRecord {
        id: row.try_get("id").map_err(|e| e.to_string())?,
        timestamp: timestamp.and_utc(),
        name: row
            .try_get::<Option<String>, _>("name")
            .map_err(|e| e.to_string())?
            .unwrap_or_default(),
        school: row
            .try_get::<Option<String>, _>("school")
            .map_err(|e| e.to_string())?
            .unwrap_or_default(),
        age: row.try_get("age").map_err(|e| e.to_string())?,
        address: row
            .try_get::<Option<String>, _>("address")
            .map_err(|e| e.to_string())?
            .unwrap_or_default(),
        phone: row
            .try_get::<Option<String>, _>("phone")
            .map_err(|e| e.to_string())?
            .unwrap_or_default(),
        shape,
        category,
        parameters: row.try_get("parameters").map_err(|e| e.to_string())?,
        result: row.try_get("result").map_err(|e| e.to_string())?,
    })
}
