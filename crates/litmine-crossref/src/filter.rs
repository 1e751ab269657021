use std::path::Path;

use anyhow::Result;

use litmine_core::record::Record;
use litmine_core::relevance::{filter_dir, CompiledFilter, FilterStats, TextFields};

use crate::key;

/// Crossref works carry the title as a one-element string list and the
/// abstract as JATS-flavoured text under `abstract`.
pub const TEXT_FIELDS: TextFields = TextFields {
    title: "title",
    abstract_text: "abstract",
};

/// Filter every yearly dump under `in_dir` into `results_<year>.jsonl`
/// files under `out_dir`, deduplicating by DOI on the way.
pub fn filter_dumps(in_dir: &Path, out_dir: &Path, filter: &CompiledFilter) -> Result<FilterStats> {
    filter_dir(
        in_dir,
        out_dir,
        filter,
        TEXT_FIELDS,
        key::identity_key,
        None::<fn(&Record) -> bool>,
    )
}
