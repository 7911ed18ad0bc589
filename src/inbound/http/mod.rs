//! Inbound HTTP adapters: handlers, DTOs, and error mapping.

pub mod calculations;
pub mod csv;
pub mod dashboard;
mod error;
pub mod health;
pub mod state;
pub mod sync;

pub use error::ApiResult;

use actix_web::web;

/// Register the versioned API routes on a service config.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(calculations::create_calculation)
            .service(dashboard::get_dashboard)
            .service(sync::run_sync)
            .service(sync::sync_status)
            .service(csv::csv_info)
            .service(csv::download_csv),
    );
}
