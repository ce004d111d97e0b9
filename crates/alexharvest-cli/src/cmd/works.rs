//! Works subcommand - collect works for discovered authors into JSONL

use alexharvest_core::{fmt_num, SharedProgress, SystemClock};
use alexharvest_openalex::{Config, WorkSummary};
use anyhow::Result;
use clap::Args;

use super::{fmt_secs, print_summary};

#[derive(Args, Debug)]
pub struct WorksArgs {
    /// Only process the first N authors
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Requests-per-second ceiling
    #[arg(long)]
    pub rps: Option<f64>,

    /// Flush to disk every N fetched pages
    #[arg(long)]
    pub checkpoint_interval: Option<u64>,
}

impl WorksArgs {
    pub fn apply(&self, config: &mut Config) {
        if self.limit.is_some() {
            config.works.max_authors = self.limit;
        }
        if let Some(rps) = self.rps {
            config.works.max_requests_per_second = rps;
        }
        if let Some(interval) = self.checkpoint_interval {
            config.works.checkpoint_interval = interval;
        }
    }
}

pub fn run(args: WorksArgs, mut config: Config, progress: &SharedProgress) -> Result<()> {
    args.apply(&mut config);
    collect(&config, progress).map(|_| ())
}

/// Run work collection and print its summary
pub(crate) fn collect(config: &Config, progress: &SharedProgress) -> Result<WorkSummary> {
    let transport = super::transport(&config.http, config.api_key.as_deref())?;
    let summary = alexharvest_openalex::collect_works(&transport, SystemClock, config, progress)?;

    print_summary(
        "Work Collection",
        &[
            (
                "Authors",
                format!(
                    "{}/{} ({} failed)",
                    fmt_num(summary.authors_completed),
                    fmt_num(summary.authors_total),
                    fmt_num(summary.authors_failed)
                ),
            ),
            ("Pages", summary.pages.to_string()),
            ("Requests", summary.requests.to_string()),
            ("Works seen", fmt_num(summary.works_seen)),
            ("Full records", fmt_num(summary.full_records)),
            ("Degenerate records", fmt_num(summary.degenerate_records)),
            ("Dropped (year)", fmt_num(summary.dropped)),
            ("Written", fmt_num(summary.records_written)),
            ("Output", config.output.works.display().to_string()),
            ("Time", fmt_secs(summary.elapsed)),
        ],
    );
    Ok(summary)
}
