//! Periodic replication scheduler.
//!
//! Runs one catch-up sync at startup when the primary store already holds
//! data, then triggers a run every configured interval. Failures are logged
//! and the next tick retries; the replicator's own lock keeps scheduled and
//! manual runs from overlapping.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::ports::{RecordStore, SyncCommand};

/// Run the startup catch-up sync, if warranted, then loop forever on the
/// interval. Intended to be spawned as a background task.
pub async fn run(
    sync: Arc<dyn SyncCommand>,
    primary: Arc<dyn RecordStore>,
    interval: Duration,
) {
    startup_sync(sync.as_ref(), primary.as_ref()).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the startup sync already covered
    // it.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match sync.run_sync().await {
            Ok(report) => {
                info!(records = report.records_synced, "scheduled sync completed");
            }
            Err(error) => warn!(%error, "scheduled sync failed"),
        }
    }
}

async fn startup_sync(sync: &dyn SyncCommand, primary: &dyn RecordStore) {
    match primary.snapshot().await {
        Ok(snapshot) if snapshot.total > 0 => match sync.run_sync().await {
            Ok(report) => {
                info!(records = report.records_synced, "startup sync completed");
            }
            Err(error) => warn!(%error, "startup sync failed"),
        },
        Ok(_) => info!("primary store is empty, skipping startup sync"),
        Err(error) => warn!(%error, "could not inspect the primary store at startup"),
    }
}
