//! Server construction: wire adapters to domain services and run actix-web.

mod config;
pub mod scheduler;

pub use config::AppConfig;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use mockable::DefaultClock;
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{RecordStore, SyncCommand, SyncQuery};
use crate::domain::{
    CsvExportService, DashboardService, Replicator, SubmissionService, UnconfiguredSync,
};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::configure_api;
use crate::outbound::csv_mirror::CsvFileMirror;
use crate::outbound::persistence::{DbPool, MySqlRecordStore, MySqlReplicaStore};

/// Replication services for one configuration: the trigger command, the
/// status query, and whether a replica actually backs them.
struct SyncServices {
    command: Arc<dyn SyncCommand>,
    query: Arc<dyn SyncQuery>,
    replica_configured: bool,
}

fn build_sync_services(config: &AppConfig, primary: Arc<dyn RecordStore>) -> SyncServices {
    match config.replica_db() {
        Some(replica_config) => {
            let replica = Arc::new(MySqlReplicaStore::new(DbPool::connect_lazy(&replica_config)));
            let replicator = Arc::new(
                Replicator::new(primary, replica, Arc::new(DefaultClock))
                    .with_batch_size(config.sync_batch_size),
            );
            SyncServices {
                command: replicator.clone(),
                query: replicator,
                replica_configured: true,
            }
        }
        None => {
            let unconfigured = Arc::new(UnconfiguredSync::new(primary));
            SyncServices {
                command: unconfigured.clone(),
                query: unconfigured,
                replica_configured: false,
            }
        }
    }
}

/// Build every service, bind the HTTP server, and run until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let primary: Arc<MySqlRecordStore> = Arc::new(MySqlRecordStore::new(DbPool::connect_lazy(
        &config.primary_db(),
    )));

    // Best effort: the service still starts (and degrades) when the primary
    // is unreachable, so submissions can resume without a restart.
    if let Err(error) = primary.ensure_schema().await {
        warn!(%error, "could not prepare the primary schema at startup");
    }

    let mirror = Arc::new(CsvFileMirror::new(config.csv_path.clone()));
    let clock = Arc::new(DefaultClock);
    let submissions = Arc::new(SubmissionService::new(
        primary.clone(),
        mirror.clone(),
        clock,
    ));
    let csv = Arc::new(CsvExportService::new(mirror));
    let dashboard = Arc::new(DashboardService::new(primary.clone()));
    let sync = build_sync_services(&config, primary.clone());

    if sync.replica_configured {
        tokio::spawn(scheduler::run(
            sync.command.clone(),
            primary.clone(),
            config.sync_interval(),
        ));
    } else {
        info!("replica host not configured, synchronisation disabled");
    }

    let http_state = web::Data::new(HttpState::new(
        submissions,
        dashboard,
        sync.command,
        sync.query,
        csv,
    ));
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(http_state.clone())
            .app_data(server_health_state.clone())
            .configure(configure_api)
            .service(live)
            .service(ready);
        #[cfg(debug_assertions)]
        let app = app.route(
            "/api-docs/openapi.json",
            web::get().to(|| async { web::Json(ApiDoc::openapi()) }),
        );
        app
    })
    .bind(config.bind_addr)?;

    info!(addr = %config.bind_addr, "listening");
    health_state.mark_ready();
    let outcome = server.run().await;
    health_state.mark_unhealthy();
    outcome
}
