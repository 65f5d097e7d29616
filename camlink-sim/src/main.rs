use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use camlink_sim::{SimConfig, Simulation};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate the attendance clock camera link over an in-memory SPI bus")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the last fetched image here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of capture/fetch cycles
    #[arg(short = 'n', long, default_value_t = 1)]
    captures: u32,

    /// Increase logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = SimConfig::load(args.config.as_deref()).context("loading configuration")?;
    let mut sim = Simulation::new(&config).context("starting simulation")?;

    let image = sim
        .run_captures(args.captures)
        .context("capture cycle failed")?;

    if let Some(path) = &args.output {
        fs::write(path, &image).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), bytes = image.len(), "Image written");
    }

    let master = sim.master_state();
    let slave = sim.slave_state();
    info!(
        requested = master.captures_requested,
        completed = master.captures_completed,
        transfer_errors = master.transfer_errors,
        "Master link"
    );
    info!(
        commands = slave.commands_received,
        bytes = slave.bytes_transferred,
        errors = slave.errors,
        status = ?slave.status,
        "Slave link"
    );

    Ok(())
}
