use anyhow::Context;
use clap::Parser;
use tracing::info;

use cinnamon_cli::{config, Cli, Host};
use cinnamon_core::logging::init_logging;
use cinnamon_core::CinnamonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(CinnamonConfig::config_path);
    let mut config = config::load_or_create(&config_path)?;
    cli.apply(&mut config);

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(&config.logging).context("Failed to initialise logging")?;

    info!("Starting cinnamon...");

    let mut host = Host::new(&config)?;
    host.schedule_startup(&cli.scripts);
    host.run(cli.frames).await;
    host.shutdown();

    Ok(())
}
