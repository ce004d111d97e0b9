//! alexharvest - OpenAlex author and works harvester
//!
//! Discovers authors affiliated with institutions matching a filter,
//! enriches them with detail records, and collects their works into JSONL.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "alexharvest")]
#[command(about = "Harvest OpenAlex author and works metadata")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "debug")]
    quiet: bool,

    /// Config file path (default: ./alexharvest.toml or ~/.config/alexharvest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for all files not set explicitly in the config
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Discover authors matching the filter into the basic author CSV
    Authors(cmd::authors::AuthorsArgs),
    /// Fetch detail records for every discovered author
    Enrich(cmd::enrich::EnrichArgs),
    /// Collect works for every discovered author into JSONL
    Works(cmd::works::WorksArgs),
    /// Run discovery, enrichment and work collection in order
    All(cmd::all::AllArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(alexharvest_core::ProgressContext::new());

    // Logging:
    //   TTY:     warn unless --debug; progress bars show activity
    //   non-TTY: info unless --debug or --quiet; logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let verbosity = alexharvest_core::Verbosity::from_flags(cli.quiet || is_tty, cli.debug);
    alexharvest_core::init_logging(verbosity, multi);

    let mut file_config = if let Some(path) = &cli.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };
    if let Some(dir) = cli.output_dir {
        file_config.output.dir = dir;
    }
    let config = file_config.to_runtime()?;

    match cli.command {
        Command::Authors(args) => cmd::authors::run(args, config, &progress),
        Command::Enrich(args) => cmd::enrich::run(args, config, &progress),
        Command::Works(args) => cmd::works::run(args, config, &progress),
        Command::All(args) => cmd::all::run(args, config, &progress),
        Command::Config => {
            cmd::config::show(&config);
            Ok(())
        }
    }
}
