//! Author Discovery: crawl `/authors` for the configured filter and write
//! the basic author CSV in one shot.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use alexharvest_core::{get_json, write_csv, Clock, ProgressContext, Transport};

use crate::api::Page;
use crate::config::Config;
use crate::paginate::{crawl, request_target};
use crate::transform::{AuthorBasicRecord, AuthorRow};

/// Summary of a discovery crawl
#[derive(Debug, Clone)]
pub struct DiscoverySummary {
    pub pages: u64,
    pub authors: usize,
    /// `false` when a page request failed and the crawl stopped early
    pub completed: bool,
    pub elapsed: Duration,
}

impl DiscoverySummary {
    pub fn log(&self) {
        log::info!("=== Discovery Summary ===");
        log::info!(
            "Authors: {} from {} pages{}",
            self.authors,
            self.pages,
            if self.completed { "" } else { " (halted early)" }
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

#[derive(Debug, Clone)]
pub enum DiscoveryOutcome {
    /// Authors written to `path`
    Saved {
        path: PathBuf,
        summary: DiscoverySummary,
    },
    /// Nothing retrieved; no file written
    Empty(DiscoverySummary),
}

impl DiscoveryOutcome {
    pub fn summary(&self) -> &DiscoverySummary {
        match self {
            Self::Saved { summary, .. } | Self::Empty(summary) => summary,
        }
    }
}

/// Crawl every author page. No retries: the first failed page ends the crawl.
pub fn crawl_authors<C: Clock>(
    transport: &dyn Transport,
    clock: &C,
    config: &Config,
    progress: &ProgressContext,
) -> anyhow::Result<(Vec<AuthorRow>, DiscoverySummary)> {
    let start = Instant::now();
    let base_url = config.authors_url();
    let params = [
        ("filter", config.discovery.filter.clone()),
        ("per_page", config.discovery.per_page.to_string()),
    ];
    let line = progress.stage_line("authors");
    let mut authors = Vec::new();
    let mut first = true;

    let report = crawl(
        |request| {
            if !first {
                clock.sleep(config.discovery.page_pause);
            }
            first = false;
            let (url, query) = request_target(request, &base_url, &params);
            let outcome = get_json::<Page<AuthorRow>>(transport, &url, &query);
            if let Some(e) = outcome.error() {
                log::error!("discovery halted: {e}");
            }
            outcome
        },
        |page| {
            authors.extend(page.results);
            line.set_message(format!("{} authors", authors.len()));
            Ok::<_, anyhow::Error>(())
        },
    )?;
    line.finish_and_clear();

    let summary = DiscoverySummary {
        pages: report.pages,
        authors: authors.len(),
        completed: report.completed(),
        elapsed: start.elapsed(),
    };
    Ok((authors, summary))
}

/// Run Author Discovery and write `output.authors_basic`.
pub fn discover<C: Clock>(
    transport: &dyn Transport,
    clock: &C,
    config: &Config,
    progress: &ProgressContext,
) -> anyhow::Result<DiscoveryOutcome> {
    log::info!("Discovering authors matching {}", config.discovery.filter);
    let (authors, summary) = crawl_authors(transport, clock, config, progress)?;
    summary.log();

    if authors.is_empty() {
        log::warn!("No authors found");
        return Ok(DiscoveryOutcome::Empty(summary));
    }

    let records: Vec<AuthorBasicRecord> =
        authors.into_iter().map(AuthorBasicRecord::from).collect();
    let path = config.output.authors_basic.clone();
    write_csv(&records, &path)?;
    log::info!("Saved {} authors to {}", records.len(), path.display());
    Ok(DiscoveryOutcome::Saved { path, summary })
}
