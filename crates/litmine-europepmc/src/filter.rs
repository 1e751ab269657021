use std::path::Path;

use anyhow::Result;

use litmine_core::record::Record;
use litmine_core::relevance::{filter_dir, CompiledFilter, FilterStats, TextFields};

use crate::fulltext::has_full_text;
use crate::key;

/// Europe PMC `core` results carry plain-string `title` and `abstractText`.
pub const TEXT_FIELDS: TextFields = TextFields {
    title: "title",
    abstract_text: "abstractText",
};

/// Filter every yearly dump under `in_dir` into `results_<year>.jsonl`
/// files under `out_dir`. With `require_full_text`, records without a
/// full-text signal are dropped before the patterns run.
pub fn filter_dumps(
    in_dir: &Path,
    out_dir: &Path,
    filter: &CompiledFilter,
    require_full_text: bool,
) -> Result<FilterStats> {
    let gate = require_full_text.then_some(|r: &Record| has_full_text(r));
    filter_dir(in_dir, out_dir, filter, TEXT_FIELDS, key::identity_key, gate)
}
