//! Service entry-point: tracing setup, configuration parsing, server run.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use figura::server::{self, AppConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::parse();
    server::run(config).await
}
