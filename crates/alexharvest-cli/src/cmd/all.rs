//! All subcommand - discovery, enrichment and work collection in order

use alexharvest_core::SharedProgress;
use alexharvest_openalex::{Config, DiscoveryOutcome};
use anyhow::Result;
use clap::Args;

use super::authors::AuthorsArgs;
use super::enrich::EnrichArgs;
use super::works::WorksArgs;

#[derive(Args, Debug)]
pub struct AllArgs {
    #[command(flatten)]
    pub authors: AuthorsArgs,

    #[command(flatten)]
    pub enrich: EnrichArgs,

    #[command(flatten)]
    pub works: WorksArgs,

    /// Skip the enrichment stage
    #[arg(long)]
    pub skip_enrich: bool,
}

pub fn run(args: AllArgs, mut config: Config, progress: &SharedProgress) -> Result<()> {
    args.authors.apply(&mut config);
    args.enrich.apply(&mut config);
    args.works.apply(&mut config);

    if let DiscoveryOutcome::Empty(_) = super::authors::discover(&config, progress)? {
        log::warn!("No authors discovered; skipping enrichment and work collection");
        return Ok(());
    }

    if args.skip_enrich {
        log::info!("Skipping enrichment");
    } else {
        super::enrich::enrich(&config, progress)?;
    }

    super::works::collect(&config, progress)?;
    Ok(())
}
