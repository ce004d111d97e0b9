//! Authors subcommand - discover authors into the basic author CSV

use alexharvest_core::{fmt_num, SharedProgress, SystemClock};
use alexharvest_openalex::{Config, DiscoveryOutcome};
use anyhow::Result;
use clap::Args;

use super::{fmt_secs, print_summary};

#[derive(Args, Debug)]
pub struct AuthorsArgs {
    /// Author filter expression (e.g. last_known_institutions.country_code:QA)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Results per page
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl AuthorsArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(filter) = &self.filter {
            config.discovery.filter = filter.clone();
        }
        if let Some(per_page) = self.per_page {
            config.discovery.per_page = per_page;
        }
    }
}

pub fn run(args: AuthorsArgs, mut config: Config, progress: &SharedProgress) -> Result<()> {
    args.apply(&mut config);
    discover(&config, progress).map(|_| ())
}

/// Run discovery and print its summary
pub(crate) fn discover(config: &Config, progress: &SharedProgress) -> Result<DiscoveryOutcome> {
    let transport = super::transport(&config.http, config.api_key.as_deref())?;
    let outcome = alexharvest_openalex::discover(&transport, &SystemClock, config, progress)?;

    let summary = outcome.summary();
    let output = match &outcome {
        DiscoveryOutcome::Saved { path, .. } => path.display().to_string(),
        DiscoveryOutcome::Empty(_) => "(nothing written)".to_string(),
    };
    print_summary(
        "Discovery",
        &[
            ("Filter", config.discovery.filter.clone()),
            ("Pages", summary.pages.to_string()),
            ("Authors", fmt_num(summary.authors)),
            (
                "Status",
                if summary.completed { "complete" } else { "halted early" }.to_string(),
            ),
            ("Output", output),
            ("Time", fmt_secs(summary.elapsed)),
        ],
    );
    Ok(outcome)
}
