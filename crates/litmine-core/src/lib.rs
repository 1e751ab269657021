//! litmine core - shared infrastructure for literature-harvesting pipelines
//!
//! This crate provides the source-agnostic building blocks: the record
//! model, JSONL partition storage, deduplication, cursor pagination,
//! the yearly harvest orchestrator, and the regex relevance filter.

pub mod dedup;
pub mod harvest;
pub mod http;
pub mod logging;
pub mod pagination;
pub mod progress;
pub mod record;
pub mod relevance;
pub mod store;

// Re-exports for convenience
pub use dedup::{DedupStats, SeenKeys, dedup_file, dedup_path, load_seen_keys};
pub use harvest::{HarvestOptions, HarvestSource, YearStats, run_queries, run_yearly};
pub use http::{FetchError, SHARED_RUNTIME, get_json};
pub use logging::init_logging;
pub use pagination::{CursorStream, Page, PageFetcher, RetryPolicy, START_CURSOR};
pub use progress::{ProgressContext, fmt_num};
pub use record::Record;
pub use relevance::{
    CompiledFilter, FilterConfig, FilterStats, Scope, TextFields, filter_dir, filter_file,
    results_name, year_token,
};
pub use store::PartitionWriter;
