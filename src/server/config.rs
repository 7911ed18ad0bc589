//! Application configuration: command-line flags with environment fallbacks.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::outbound::persistence::PoolConfig;

/// `figura` server arguments. Every flag can also be supplied through the
/// environment variable named alongside it.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "figura",
    about = "Shape calculation service with primary-to-replica MySQL sync",
    version
)]
pub struct AppConfig {
    /// Address and port the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Primary database host.
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,
    /// Primary database port.
    #[arg(long, env = "DB_PORT", default_value_t = 3306)]
    pub db_port: u16,
    /// Primary database user.
    #[arg(long, env = "DB_USER", default_value = "root")]
    pub db_user: String,
    /// Primary database password.
    #[arg(long, env = "DB_PASS", default_value = "", hide_env_values = true)]
    pub db_pass: String,
    /// Primary database name.
    #[arg(long, env = "DB_NAME", default_value = "figura")]
    pub db_name: String,
    /// Primary pool size.
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,
    /// Seconds to wait for a pooled connection before failing.
    #[arg(long, env = "DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 30)]
    pub db_acquire_timeout_secs: u64,

    /// Replica database host. Synchronisation stays disabled until this is
    /// set.
    #[arg(long, env = "REPLICA_DB_HOST")]
    pub replica_db_host: Option<String>,
    /// Replica database port.
    #[arg(long, env = "REPLICA_DB_PORT", default_value_t = 3306)]
    pub replica_db_port: u16,
    /// Replica database user.
    #[arg(long, env = "REPLICA_DB_USER", default_value = "root")]
    pub replica_db_user: String,
    /// Replica database password.
    #[arg(long, env = "REPLICA_DB_PASS", default_value = "", hide_env_values = true)]
    pub replica_db_pass: String,
    /// Replica database name.
    #[arg(long, env = "REPLICA_DB_NAME", default_value = "figura")]
    pub replica_db_name: String,
    /// Replica pool size.
    #[arg(long, env = "REPLICA_DB_POOL_SIZE", default_value_t = 5)]
    pub replica_db_pool_size: u32,
    /// Require TLS when connecting to the replica.
    #[arg(
        long,
        env = "REPLICA_DB_SSL",
        default_value_t = false,
        action = clap::ArgAction::Set
    )]
    pub replica_db_ssl: bool,

    /// Minutes between scheduled replication runs.
    #[arg(long, env = "SYNC_INTERVAL_MINUTES", default_value_t = 5)]
    pub sync_interval_minutes: u64,
    /// Records per upsert batch.
    #[arg(long, env = "SYNC_BATCH_SIZE", default_value_t = 100)]
    pub sync_batch_size: usize,

    /// Path of the CSV mirror file.
    #[arg(long, env = "CSV_PATH", default_value = "data/records.csv")]
    pub csv_path: PathBuf,
}

impl AppConfig {
    /// Pool configuration for the primary store.
    pub fn primary_db(&self) -> PoolConfig {
        PoolConfig::new(&self.db_host, &self.db_name, &self.db_user, &self.db_pass)
            .with_port(self.db_port)
            .with_max_connections(self.db_pool_size)
            .with_acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }

    /// Pool configuration for the replica store, or `None` when no replica
    /// host is configured.
    pub fn replica_db(&self) -> Option<PoolConfig> {
        let host = self.replica_db_host.as_deref()?;
        Some(
            PoolConfig::new(
                host,
                &self.replica_db_name,
                &self.replica_db_user,
                &self.replica_db_pass,
            )
            .with_port(self.replica_db_port)
            .with_max_connections(self.replica_db_pool_size)
            .with_acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
            .with_tls(self.replica_db_ssl),
        )
    }

    /// Interval between scheduled replication runs.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_minutes.max(1) * 60)
    }
}
