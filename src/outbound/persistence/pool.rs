//! MySQL connection pool wrapper.
//!
//! Pools are created lazily so the service can start (and the dashboard can
//! degrade gracefully) while a database is still unreachable; connections
//! are only established on first checkout.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};

/// Configuration for one MySQL connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub tls: bool,
}

impl PoolConfig {
    /// Defaults matching the original deployment: ten connections, a
    /// thirty-second acquire timeout, TLS off.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: 3306,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            tls: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }
}

/// Lazily connected MySQL pool.
#[derive(Clone)]
pub struct DbPool {
    inner: MySqlPool,
}

impl DbPool {
    /// Build a pool from the configuration without contacting the server.
    pub fn connect_lazy(config: &PoolConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(if config.tls {
                MySqlSslMode::Required
            } else {
                MySqlSslMode::Preferred
            });

        let inner = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(options);

        Self { inner }
    }

    pub fn inner(&self) -> &MySqlPool {
        &self.inner
    }
}
