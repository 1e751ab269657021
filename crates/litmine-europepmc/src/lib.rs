//! Europe PMC REST search source.
//!
//! Deep-pages `/search` with `cursorMark` pagination. Records carry a
//! layered identity (DOI, then Europe PMC id, then a title hash) and an
//! optional full-text availability gate for filtering.

pub mod api;
pub mod config;
pub mod filter;
pub mod fulltext;
pub mod key;
pub mod source;

pub use api::SearchFetcher;
pub use config::EuropePmcConfig;
pub use filter::{filter_dumps, TEXT_FIELDS};
pub use fulltext::has_full_text;
pub use key::identity_key;
pub use source::{pub_year_range, EuropePmcSource};
