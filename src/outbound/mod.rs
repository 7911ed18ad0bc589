//! Outbound adapters: persistence and the CSV mirror.

pub mod csv_mirror;
pub mod persistence;
