//! Work Collection: per-author cursor crawl of `/works`, rate limited and
//! retried, with periodic append-only checkpoints to JSONL.

use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

use alexharvest_core::{
    fetch_with_retry, get_json, read_csv_column, Clock, JsonlSink, ProgressContext, RateLimiter,
    Transport,
};
use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::api::Page;
use crate::config::{short_id, Config};
use crate::enrichment::AUTHOR_ID_COLUMN;
use crate::paginate::{crawl, request_target, CrawlReport};
use crate::transform::{WorkAnchor, WorkRecord, WorkRow};

/// Author IDs from the discovery CSV: empty cells skipped, duplicates
/// removed, first-seen order kept.
pub fn load_author_ids(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(read_csv_column(path, AUTHOR_ID_COLUMN)?
        .into_iter()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect())
}

// === Checkpoint buffer ===

/// Buffers records and appends them to a sink every `interval` pages.
///
/// Each flush drains the buffer, so no record is written twice.
#[derive(Debug)]
pub struct CheckpointBuffer<T> {
    sink: JsonlSink,
    interval: u64,
    pages: u64,
    buffer: Vec<T>,
    written: usize,
}

impl<T: Serialize> CheckpointBuffer<T> {
    pub fn new(sink: JsonlSink, interval: u64) -> Self {
        Self {
            sink,
            interval: interval.max(1),
            pages: 0,
            buffer: Vec::new(),
            written: 0,
        }
    }

    pub fn push(&mut self, record: T) {
        self.buffer.push(record);
    }

    /// Count one successfully fetched page; flushes on the checkpoint cadence.
    pub fn page_done(&mut self) -> anyhow::Result<()> {
        self.pages += 1;
        if self.pages % self.interval == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Append everything buffered and clear the buffer.
    pub fn flush(&mut self) -> anyhow::Result<usize> {
        let n = self
            .sink
            .append(&self.buffer)
            .with_context(|| format!("Cannot append to {}", self.sink.path().display()))?;
        self.buffer.clear();
        self.written += n;
        if n > 0 {
            log::info!("Checkpoint: {n} records appended to {}", self.sink.path().display());
        }
        Ok(n)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Records appended so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Pages counted so far
    pub fn pages(&self) -> u64 {
        self.pages
    }
}

// === Summary ===

/// Per-author crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorCrawl {
    pub pages: u64,
    pub works_seen: usize,
    pub full: usize,
    pub degenerate: usize,
    pub dropped: usize,
    /// A page exhausted its retries and the rest of the author was skipped
    pub failed: bool,
}

/// Summary of a Work Collection run
#[derive(Debug, Clone, Default)]
pub struct WorkSummary {
    pub authors_total: usize,
    pub authors_completed: usize,
    pub authors_failed: usize,
    pub pages: u64,
    pub requests: u64,
    pub works_seen: usize,
    pub full_records: usize,
    pub degenerate_records: usize,
    pub dropped: usize,
    pub records_written: usize,
    pub elapsed: Duration,
}

impl WorkSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    fn add(&mut self, author: &AuthorCrawl) {
        if author.failed {
            self.authors_failed += 1;
        } else {
            self.authors_completed += 1;
        }
        self.pages += author.pages;
        self.works_seen += author.works_seen;
        self.full_records += author.full;
        self.degenerate_records += author.degenerate;
        self.dropped += author.dropped;
    }

    pub fn log(&self) {
        log::info!("=== Work Collection Summary ===");
        log::info!(
            "Authors: {}/{} completed ({} failed)",
            self.authors_completed,
            self.authors_total,
            self.authors_failed
        );
        log::info!(
            "Works: {} seen, {} full, {} degenerate, {} dropped",
            self.works_seen,
            self.full_records,
            self.degenerate_records,
            self.dropped
        );
        log::info!(
            "Pages: {} ({} requests), {} records written",
            self.pages,
            self.requests,
            self.records_written
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if self.requests > 0 && self.elapsed > Duration::ZERO {
            log::info!(
                "Throughput: {:.1} req/s",
                self.requests as f64 / self.elapsed.as_secs_f64()
            );
        }
    }
}

// === Collector ===

/// Sequential per-author works crawler sharing one limiter and one output buffer.
pub struct WorkCollector<'a, C: Clock> {
    transport: &'a dyn Transport,
    config: &'a Config,
    limiter: RateLimiter<C>,
    buffer: CheckpointBuffer<WorkRecord>,
}

impl<'a, C: Clock> WorkCollector<'a, C> {
    pub fn new(transport: &'a dyn Transport, clock: C, config: &'a Config) -> Self {
        Self {
            transport,
            config,
            limiter: RateLimiter::new(clock, config.works.max_requests_per_second),
            buffer: CheckpointBuffer::new(
                JsonlSink::new(&config.output.works),
                config.works.checkpoint_interval,
            ),
        }
    }

    /// Crawl all works of one author into the buffer.
    ///
    /// Fetch failures end this author's crawl; only output I/O errors propagate.
    pub fn collect_author(&mut self, author_id: &str) -> anyhow::Result<AuthorCrawl> {
        let Self {
            transport,
            config,
            limiter,
            buffer,
        } = self;
        let transport = *transport;
        let config = *config;

        let source_link = config.works_query_url(author_id);
        let params = [("per_page", config.works.per_page.to_string())];
        let label = short_id(author_id).to_string();
        let policy = config.works.policy;
        let mut stats = AuthorCrawl::default();

        let report: CrawlReport = crawl(
            |request| {
                let (url, query) = request_target(request, &source_link, &params);
                fetch_with_retry(&label, config.works.retry, &mut *limiter, || {
                    get_json::<Page<Value>>(transport, &url, &query)
                })
            },
            |page: Page<Value>| {
                let anchor = WorkAnchor {
                    author_id,
                    number_of_works: page.meta.count,
                    source_link: &source_link,
                };
                for value in page.results {
                    stats.works_seen += 1;
                    let work: WorkRow = match serde_json::from_value(value) {
                        Ok(work) => work,
                        Err(e) => {
                            log::warn!("{label}: dropping malformed work: {e}");
                            stats.dropped += 1;
                            continue;
                        }
                    };
                    match policy.extract(work, &anchor) {
                        Some(record) => {
                            if record.is_degenerate() {
                                stats.degenerate += 1;
                            } else {
                                stats.full += 1;
                            }
                            buffer.push(record);
                        }
                        None => stats.dropped += 1,
                    }
                }
                buffer.page_done()
            },
        )?;

        stats.pages = report.pages;
        stats.failed = !report.completed();
        if stats.failed {
            log::warn!(
                "{label}: skipping remaining pages after {} page(s)",
                report.pages
            );
        }
        Ok(stats)
    }

    /// Crawl every author in order, then flush residual records.
    pub fn run(
        mut self,
        author_ids: &[String],
        progress: &ProgressContext,
    ) -> anyhow::Result<WorkSummary> {
        let start = Instant::now();
        let mut summary = WorkSummary {
            authors_total: author_ids.len(),
            ..WorkSummary::empty()
        };

        let pb = progress.counter_bar("works", author_ids.len() as u64);
        for author_id in author_ids {
            pb.set_message(short_id(author_id).to_string());
            let stats = self.collect_author(author_id)?;
            summary.add(&stats);
            pb.inc(1);
        }
        pb.finish_and_clear();

        if self.buffer.buffered() > 0 {
            self.buffer.flush()?;
        }

        summary.requests = self.limiter.requests();
        summary.records_written = self.buffer.written();
        summary.elapsed = start.elapsed();
        summary.log();
        Ok(summary)
    }
}

/// Run Work Collection over the IDs in `output.authors_basic`.
pub fn collect_works<C: Clock>(
    transport: &dyn Transport,
    clock: C,
    config: &Config,
    progress: &ProgressContext,
) -> anyhow::Result<WorkSummary> {
    let mut author_ids = load_author_ids(&config.output.authors_basic)?;
    if let Some(max) = config.works.max_authors {
        author_ids.truncate(max);
    }
    if author_ids.is_empty() {
        log::warn!("No author IDs in {}", config.output.authors_basic.display());
        return Ok(WorkSummary::empty());
    }
    log::info!(
        "Collecting works for {} authors into {}",
        author_ids.len(),
        config.output.works.display()
    );
    WorkCollector::new(transport, clock, config).run(&author_ids, progress)
}
