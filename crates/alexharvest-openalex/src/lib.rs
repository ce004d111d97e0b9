//! OpenAlex author and works harvesting
//!
//! Three pipelines share one cursor driver and the core fetch primitives:
//! - [`discovery`]: crawl `/authors` for a filter into `authors_basic.csv`
//! - [`enrichment`]: per-author detail lookups into `authors_detailed.csv`
//! - [`works`]: per-author works crawl appended to `works_detailed.jsonl`

pub mod api;
pub mod config;
pub mod discovery;
pub mod enrichment;
pub mod paginate;
pub mod state;
pub mod transform;
pub mod works;

pub use config::{short_id, Config, OPENALEX_API_URL};
pub use discovery::{discover, DiscoveryOutcome, DiscoverySummary};
pub use enrichment::{enrich, EnrichmentSummary};
pub use transform::{WorkPolicy, WorkRecord};
pub use works::{collect_works, load_author_ids, WorkCollector, WorkSummary};
