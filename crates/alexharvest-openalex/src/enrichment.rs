//! Author Enrichment: one detail request per discovered author on a
//! fixed-size worker pool.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use alexharvest_core::{
    get_json, read_csv_column, write_csv, FetchOutcome, ProgressContext, Transport,
};
use indicatif::ProgressBar;
use rayon::prelude::*;

use crate::config::Config;
use crate::transform::{AuthorDetailRecord, AuthorRow};

/// Column holding author IDs in the discovery CSV
pub const AUTHOR_ID_COLUMN: &str = "Author ID";

/// Summary of an enrichment run
#[derive(Debug, Clone)]
pub struct EnrichmentSummary {
    pub requested: usize,
    pub enriched: usize,
    pub failed: usize,
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl EnrichmentSummary {
    pub fn log(&self) {
        log::info!("=== Enrichment Summary ===");
        log::info!(
            "Authors: {}/{} enriched ({} failed)",
            self.enriched,
            self.requested,
            self.failed
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Fetch one author's detail record; any failure yields `None`.
///
/// A blank ID is never requested, and a response without an `id` is not an
/// author record.
fn fetch_detail(
    transport: &dyn Transport,
    config: &Config,
    author_id: &str,
) -> Option<AuthorDetailRecord> {
    if author_id.trim().is_empty() {
        log::warn!("skipping blank author ID");
        return None;
    }
    let url = config.author_detail_url(author_id);
    match get_json::<AuthorRow>(transport, &url, &[]) {
        FetchOutcome::Success(row) if row.id.is_some() => Some(AuthorDetailRecord::from(row)),
        FetchOutcome::Success(_) => {
            log::warn!("{author_id}: response from {url} has no author id");
            None
        }
        FetchOutcome::Retryable(e) | FetchOutcome::Terminal(e) => {
            log::warn!("{author_id}: {e}");
            None
        }
    }
}

/// Enrich `author_ids` on a pool of `enrichment.workers` threads.
///
/// Output order follows `author_ids`; failed lookups are left out.
/// `pb` advances once per finished request.
pub fn enrich_ids(
    transport: &dyn Transport,
    config: &Config,
    author_ids: &[String],
    pb: &ProgressBar,
) -> anyhow::Result<Vec<AuthorDetailRecord>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.enrichment.workers.max(1))
        .thread_name(|i| format!("enrich-{i}"))
        .build()?;

    let results: Vec<Option<AuthorDetailRecord>> = pool.install(|| {
        author_ids
            .par_iter()
            .map(|id| {
                let record = fetch_detail(transport, config, id);
                pb.inc(1);
                record
            })
            .collect()
    });

    Ok(results.into_iter().flatten().collect())
}

/// Run Author Enrichment from `output.authors_basic` into `output.authors_detailed`.
pub fn enrich(
    transport: &dyn Transport,
    config: &Config,
    progress: &ProgressContext,
) -> anyhow::Result<EnrichmentSummary> {
    let start = Instant::now();
    let author_ids = read_csv_column(&config.output.authors_basic, AUTHOR_ID_COLUMN)?;
    log::info!(
        "Enriching {} authors with {} workers",
        author_ids.len(),
        config.enrichment.workers
    );

    let pb = progress.counter_bar("enrich", author_ids.len() as u64);
    let records = enrich_ids(transport, config, &author_ids, &pb)?;
    pb.finish_and_clear();

    let output = config.output.authors_detailed.clone();
    write_csv(&records, &output)?;
    log::info!("Saved {} authors to {}", records.len(), output.display());

    let summary = EnrichmentSummary {
        requested: author_ids.len(),
        enriched: records.len(),
        failed: author_ids.len() - records.len(),
        output,
        elapsed: start.elapsed(),
    };
    summary.log();
    Ok(summary)
}
