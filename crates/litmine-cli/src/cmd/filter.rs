//! Filter subcommand - regex relevance filtering of dump directories

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use litmine_core::fmt_num;
use litmine_core::relevance::FilterConfig;

use super::{stats_table, Source};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Directory of dump files to filter
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for the result files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Which source produced the dumps
    #[arg(short, long, value_enum, default_value = "crossref")]
    pub source: Source,

    /// JSON file of keyword groups, e.g. {"groups": {"kw": ["lithium"]}, "scope": "combined"}
    #[arg(short, long)]
    pub patterns: PathBuf,

    /// Keep only records with a full-text signal (Europe PMC only)
    #[arg(long)]
    pub require_full_text: bool,
}

pub fn run(args: FilterArgs, config: &Config) -> Result<()> {
    let source_dir = match args.source {
        Source::Crossref => "crossref",
        Source::Europepmc => "europepmc",
    };
    let in_dir = args
        .input
        .unwrap_or_else(|| config.output.default_dir.join(source_dir));
    let out_dir = args
        .output
        .unwrap_or_else(|| config.output.default_dir.join(format!("{source_dir}_results")));

    let patterns = std::fs::read_to_string(&args.patterns)
        .with_context(|| format!("reading patterns from {}", args.patterns.display()))?;
    let filter_config = FilterConfig::from_json(&patterns);
    if filter_config.groups.is_empty() {
        log::warn!("no keyword groups configured, nothing will match");
    }
    let filter = filter_config
        .compile()
        .context("compiling keyword patterns")?;

    let stats = match args.source {
        Source::Crossref => litmine_crossref::filter_dumps(&in_dir, &out_dir, &filter)?,
        Source::Europepmc => litmine_europepmc::filter_dumps(
            &in_dir,
            &out_dir,
            &filter,
            args.require_full_text,
        )?,
    };

    let mut table = stats_table(&["Examined", "Kept"]);
    table.add_row(vec![fmt_num(stats.total), fmt_num(stats.kept)]);
    println!("{table}");
    Ok(())
}
