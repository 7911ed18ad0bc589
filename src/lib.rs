//! Shape calculation service with primary-to-replica MySQL synchronisation.
//!
//! The crate follows a hexagonal layout: `domain` holds the calculation,
//! dashboard, and replication logic behind ports; `inbound` exposes the HTTP
//! adapters; `outbound` implements the MySQL stores and the CSV mirror;
//! `server` wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
