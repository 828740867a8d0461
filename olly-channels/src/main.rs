//! Olly - Main entry point.

use anyhow::Result;
use olly_channels::run;
use olly_common::config::Config;
use olly_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Olly v{}", env!("CARGO_PKG_VERSION"));

    run(&config).await
}
