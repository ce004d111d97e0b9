//! Enrich subcommand - fetch detail records for discovered authors

use alexharvest_core::{fmt_num, SharedProgress};
use alexharvest_openalex::{Config, EnrichmentSummary};
use anyhow::Result;
use clap::Args;

use super::{fmt_secs, print_summary};

#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Number of parallel requests
    #[arg(short, long)]
    pub workers: Option<usize>,
}

impl EnrichArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.enrichment.workers = workers.max(1);
        }
    }
}

pub fn run(args: EnrichArgs, mut config: Config, progress: &SharedProgress) -> Result<()> {
    args.apply(&mut config);
    enrich(&config, progress).map(|_| ())
}

/// Run enrichment and print its summary
pub(crate) fn enrich(config: &Config, progress: &SharedProgress) -> Result<EnrichmentSummary> {
    let transport = super::transport(&config.http, config.api_key.as_deref())?;
    let summary = alexharvest_openalex::enrich(&transport, config, progress)?;

    print_summary(
        "Enrichment",
        &[
            ("Input", config.output.authors_basic.display().to_string()),
            ("Workers", config.enrichment.workers.to_string()),
            ("Requested", fmt_num(summary.requested)),
            ("Enriched", fmt_num(summary.enriched)),
            ("Failed", fmt_num(summary.failed)),
            ("Output", summary.output.display().to_string()),
            ("Time", fmt_secs(summary.elapsed)),
        ],
    );
    Ok(summary)
}
