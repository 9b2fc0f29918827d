use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use contig_fs::{
    fs::{config::DiskConfig, FileSystem},
    shell::start_shell,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Interactive contiguous-allocation disk simulator.
#[derive(Parser)]
#[command(name = "contig-fs")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with disk_size, block_size and row_width
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device size in bytes
    #[arg(long)]
    disk_size: Option<u64>,

    /// Block size in bytes
    #[arg(long)]
    block_size: Option<u64>,

    /// Blocks per row of the block map
    #[arg(long)]
    row_width: Option<usize>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn disk_config(&self) -> Result<DiskConfig> {
        let mut config = match &self.config {
            Some(path) => DiskConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DiskConfig::default(),
        };

        if let Some(disk_size) = self.disk_size {
            config.disk_size = disk_size;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(row_width) = self.row_width {
            config.row_width = row_width;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .context("Failed to initialize tracing subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let fs = FileSystem::new(cli.disk_config()?)?;
    start_shell(fs)
}
