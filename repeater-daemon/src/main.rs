//! # repeaterd
//!
//! Two-port repeater controller daemon.
//!
//! ## Example
//!
//! ```bash
//! # Run on a Raspberry Pi with repeater.toml from the current directory
//! repeaterd
//!
//! # Explicit config, verbose logging
//! repeaterd --config /etc/repeater.toml --log-level debug
//!
//! # Dry run without hardware
//! repeaterd --simulate
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use repeater_daemon::{logging, Config, Controller};
use repeater_gpio::MockPort;
use std::path::PathBuf;
use tokio::sync::watch;

/// Two-port amateur-radio repeater controller.
#[derive(Parser, Debug)]
#[command(name = "repeaterd")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: repeater.toml if present)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Use an in-memory GPIO port instead of hardware
    #[arg(long)]
    simulate: bool,

    /// Log filter directive, overrides the config file (e.g. "info")
    #[arg(long)]
    log_level: Option<String>,

    /// Do not print the per-cycle status line
    #[arg(long)]
    no_status: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.no_status {
        config.status.enabled = false;
    }
    config.validate()?;

    logging::init(&config.logging)?;
    tracing::info!("repeaterd v{} starting", env!("CARGO_PKG_VERSION"));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            // Keep the sender alive so the loop is not stopped by accident
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down...");
        let _ = shutdown_tx.send(true);
    });

    if cli.simulate {
        tracing::warn!("Simulation mode: no hardware is driven");
        Controller::new(MockPort::new(), &config)
            .context("Failed to configure simulated GPIO")?
            .run(shutdown_rx)
            .await?;
    } else {
        run_hardware(&config, shutdown_rx).await?;
    }

    tracing::info!("repeaterd stopped");
    Ok(())
}

#[cfg(feature = "rpi")]
async fn run_hardware(config: &Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    let port = repeater_gpio::RpiPort::new(config.pins).context("Failed to open GPIO")?;
    Controller::new(port, config)
        .context("Failed to configure GPIO")?
        .run(shutdown)
        .await?;
    Ok(())
}

#[cfg(not(feature = "rpi"))]
async fn run_hardware(_config: &Config, _shutdown: watch::Receiver<bool>) -> Result<()> {
    anyhow::bail!("built without Raspberry Pi support; use --simulate")
}
