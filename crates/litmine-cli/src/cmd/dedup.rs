//! Dedup subcommand - compact dump files in place

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use litmine_core::dedup::dedup_path;
use litmine_core::fmt_num;

use super::{stats_table, Source};

#[derive(Args, Debug)]
pub struct DedupArgs {
    /// Dump file, or directory of dump files
    pub path: PathBuf,

    /// Which source's identity rules to apply
    #[arg(short, long, value_enum, default_value = "crossref")]
    pub source: Source,
}

pub fn run(args: DedupArgs) -> Result<()> {
    let stats = match args.source {
        Source::Crossref => dedup_path(&args.path, litmine_crossref::identity_key)?,
        Source::Europepmc => dedup_path(&args.path, litmine_europepmc::identity_key)?,
    };

    let mut table = stats_table(&["Total", "Kept", "Duplicates", "Missing key"]);
    table.add_row(vec![
        fmt_num(stats.total),
        fmt_num(stats.kept),
        fmt_num(stats.duplicates),
        fmt_num(stats.missing_key),
    ]);
    println!("{table}");
    Ok(())
}
