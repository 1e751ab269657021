//! Crossref `/works` harvesting source.
//!
//! Deep-pages the works endpoint with cursor pagination, identifies
//! records by lowercased DOI, and filters dumps on `title`/`abstract`.

pub mod api;
pub mod config;
pub mod filter;
pub mod key;
pub mod source;

pub use api::WorksFetcher;
pub use config::CrossrefConfig;
pub use filter::{filter_dumps, TEXT_FIELDS};
pub use key::identity_key;
pub use source::CrossrefSource;
