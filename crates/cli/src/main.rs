//! Hush CLI - debounce lines from stdin

use anyhow::{Context, Result};
use clap::Parser;
use hush_cli::{pipe, util};
use hush_debounce::DebounceConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Hush - print a line only once input has gone quiet
#[derive(Parser)]
#[command(name = "hush")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Quiet period before a line is printed (e.g. 300, 250ms, 2s)
    #[arg(short, long, value_parser = util::parse_due_time)]
    due: Option<Duration>,

    /// TOML file with `due_time_ms` and `flush_on_complete`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drop the pending line at end of input instead of printing it
    #[arg(long)]
    no_flush: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DebounceConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DebounceConfig::default(),
    };
    if let Some(due) = cli.due {
        config.set_due_time(due)?;
    }
    if cli.no_flush {
        config.flush_on_complete = false;
    }
    debug!(?config, "Resolved configuration");

    pipe::run(&config).await
}
