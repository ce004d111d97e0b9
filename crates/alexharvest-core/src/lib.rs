//! alexharvest core - shared plumbing for the harvesting pipelines
//!
//! Blocking HTTP transport, typed fetch outcomes, retry with backoff,
//! reactive rate limiting, flat-file persistence, logging and progress.

pub mod clock;
pub mod error;
pub mod http;
pub mod logging;
pub mod persist;
pub mod progress;
pub mod rate_limit;
pub mod retry;

// Re-exports for convenience
pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use error::{FetchError, FetchOutcome};
pub use http::{get_json, HttpConfig, HttpResponse, ReqwestTransport, Transport, SHARED_RUNTIME};
pub use logging::{init_logging, Verbosity};
pub use persist::{load_json, read_csv_column, save_json, write_csv, JsonlSink};
pub use progress::{fmt_num, ProgressContext, SharedProgress};
pub use rate_limit::RateLimiter;
pub use retry::{backoff_duration, fetch_with_retry, RetryPolicy};
