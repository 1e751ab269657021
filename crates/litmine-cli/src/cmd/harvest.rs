//! Harvest subcommand - yearly dumps and ad-hoc keyword searches

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{Datelike, Utc};
use clap::{Args, Subcommand};

use litmine_core::harvest::{run_queries, run_yearly, HarvestOptions, YearStats};
use litmine_core::pagination::RetryPolicy;
use litmine_core::{fmt_num, ProgressContext};
use litmine_crossref::{CrossrefConfig, CrossrefSource};
use litmine_europepmc::{pub_year_range, EuropePmcConfig, EuropePmcSource};

use crate::config::Config;

use super::stats_table;

#[derive(Args, Debug)]
pub struct HarvestArgs {
    #[command(subcommand)]
    pub source: HarvestSource,
}

#[derive(Subcommand, Debug)]
pub enum HarvestSource {
    /// Harvest Crossref works
    Crossref(CrossrefArgs),
    /// Harvest Europe PMC records
    Europepmc(EuropePmcArgs),
}

#[derive(Args, Debug)]
pub struct CrossrefArgs {
    /// Bibliographic query for yearly dumps
    #[arg(short, long, default_value = "lithium metal battery")]
    pub query: String,

    /// First year to harvest (default: 2010). In keyword mode, giving
    /// both years adds a publication-date filter.
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to harvest, inclusive (default: current year)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Output directory for yearly dumps
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Contact address for the polite pool (overrides config)
    #[arg(long)]
    pub mailto: Option<String>,

    /// Comma-separated field list to request per work
    #[arg(long)]
    pub select: Option<String>,

    /// Page size (Crossref caps this at 1000)
    #[arg(long)]
    pub rows: Option<usize>,

    /// Extra filter pair, key:value (repeatable)
    #[arg(long = "filter", value_name = "KEY:VALUE")]
    pub filters: Vec<String>,

    /// Run an ad-hoc keyword search instead of yearly dumps (repeatable)
    #[arg(short, long)]
    pub keyword: Vec<String>,

    /// Output file for keyword mode
    #[arg(long)]
    pub keyword_output: Option<PathBuf>,

    /// Compact an existing dump file before resuming into it
    #[arg(long)]
    pub dedupe_existing: bool,

    /// Write every record, even ones whose key was already stored
    #[arg(long)]
    pub no_dedupe: bool,
}

#[derive(Args, Debug)]
pub struct EuropePmcArgs {
    /// Base query for yearly dumps
    #[arg(short, long, default_value = "lithium metal battery")]
    pub query: String,

    /// First year to harvest (default: 2010). In keyword mode, giving
    /// both years adds a PUB_YEAR range clause.
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to harvest, inclusive (default: current year)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Output directory for yearly dumps
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page size (Europe PMC caps this at 1000)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Result detail level: core or lite
    #[arg(long)]
    pub result_type: Option<String>,

    /// Extra clause AND'ed onto every query
    #[arg(long)]
    pub extra_and: Option<String>,

    /// Run an ad-hoc keyword search instead of yearly dumps (repeatable)
    #[arg(short, long)]
    pub keyword: Vec<String>,

    /// Output file for keyword mode
    #[arg(long)]
    pub keyword_output: Option<PathBuf>,

    /// Compact an existing dump file before resuming into it
    #[arg(long)]
    pub dedupe_existing: bool,

    /// Write every record, even ones whose key was already stored
    #[arg(long)]
    pub no_dedupe: bool,
}

fn parse_filter_pairs(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|p| match p.split_once(':') {
            Some((k, v)) => Ok((k.trim().to_string(), v.trim().to_string())),
            None => bail!("filter must be key:value, got {p:?}"),
        })
        .collect()
}

fn retry_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::with_page_delay(Duration::from_millis(config.http.page_delay_ms))
}

const DEFAULT_START_YEAR: i32 = 2010;

fn harvest_options(
    config: &Config,
    out_dir: PathBuf,
    start_year: Option<i32>,
    end_year: Option<i32>,
    dedupe_existing: bool,
    no_dedupe: bool,
) -> HarvestOptions {
    let mut opts = HarvestOptions::new(
        out_dir,
        start_year.unwrap_or(DEFAULT_START_YEAR),
        end_year.unwrap_or_else(|| Utc::now().year()),
    );
    opts.dedupe_on_write = !no_dedupe;
    opts.dedupe_existing = dedupe_existing;
    opts.restart_threshold = config.http.restart_threshold;
    opts.restart_pause = Duration::from_secs(config.http.restart_pause);
    opts.policy = retry_policy(config);
    opts
}

fn print_year_stats(stats: &[YearStats]) {
    let mut table = stats_table(&["Year", "Existing", "Appended", "Unique keys"]);
    for s in stats {
        table.add_row(vec![
            s.year.to_string(),
            fmt_num(s.existing),
            fmt_num(s.appended),
            fmt_num(s.unique_keys),
        ]);
    }
    println!("{table}");
}

pub fn run(args: HarvestArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    match args.source {
        HarvestSource::Crossref(args) => run_crossref(args, config, progress),
        HarvestSource::Europepmc(args) => run_europepmc(args, config, progress),
    }
}

fn run_crossref(args: CrossrefArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    let mut extra_filters = parse_filter_pairs(&args.filters)?;
    // Keyword mode has no per-year partitioning; an explicit year range
    // becomes a publication-date filter instead. User-supplied pairs win.
    if !args.keyword.is_empty() {
        if let (Some(start), Some(end)) = (args.start_year, args.end_year) {
            if !extra_filters.iter().any(|(k, _)| k == "from-pub-date") {
                extra_filters.push(("from-pub-date".to_string(), format!("{start}-01-01")));
            }
            if !extra_filters.iter().any(|(k, _)| k == "until-pub-date") {
                extra_filters.push(("until-pub-date".to_string(), format!("{end}-12-31")));
            }
        }
    }

    let source_config = CrossrefConfig {
        base_url: config.crossref.base_url.clone(),
        query: args.query.clone(),
        mailto: args
            .mailto
            .or_else(|| config.crossref.mailto.clone())
            .unwrap_or_default(),
        select: args.select.unwrap_or_else(|| config.crossref.select.clone()),
        rows: args.rows.unwrap_or(config.crossref.rows),
        timeout: Duration::from_secs(config.http.timeout),
        extra_filters,
        ..CrossrefConfig::default()
    };
    let source = CrossrefSource::new(source_config);

    let out_dir = args
        .output
        .unwrap_or_else(|| config.output.default_dir.join("crossref"));

    if !args.keyword.is_empty() {
        let out_path = args
            .keyword_output
            .unwrap_or_else(|| out_dir.join("keyword_results.jsonl"));
        let written = run_queries(
            &source,
            &args.keyword,
            &out_path,
            &retry_policy(config),
            !args.no_dedupe,
            progress,
        )?;
        println!("Wrote {} records to {}", fmt_num(written), out_path.display());
        return Ok(());
    }

    let opts = harvest_options(
        config,
        out_dir,
        args.start_year,
        args.end_year,
        args.dedupe_existing,
        args.no_dedupe,
    );
    let stats = run_yearly(&source, &opts, progress)?;
    print_year_stats(&stats);
    Ok(())
}

fn run_europepmc(args: EuropePmcArgs, config: &Config, progress: &ProgressContext) -> Result<()> {
    // Keyword mode has no per-year partitioning; an explicit year range
    // becomes a PUB_YEAR clause merged into the extra AND term.
    let mut extra_and = args.extra_and;
    if !args.keyword.is_empty() {
        if let (Some(start), Some(end)) = (args.start_year, args.end_year) {
            let clause = pub_year_range(start, end);
            extra_and = Some(match extra_and {
                Some(extra) => format!("({extra}) AND ({clause})"),
                None => clause,
            });
        }
    }

    let source_config = EuropePmcConfig {
        base_url: config.europepmc.base_url.clone(),
        query: args.query.clone(),
        result_type: args
            .result_type
            .unwrap_or_else(|| config.europepmc.result_type.clone()),
        page_size: args.page_size.unwrap_or(config.europepmc.page_size),
        timeout: Duration::from_secs(config.http.timeout),
        extra_and,
    };
    let source = EuropePmcSource::new(source_config);

    let out_dir = args
        .output
        .unwrap_or_else(|| config.output.default_dir.join("europepmc"));

    if !args.keyword.is_empty() {
        let out_path = args
            .keyword_output
            .unwrap_or_else(|| out_dir.join("keyword_results.jsonl"));
        let written = run_queries(
            &source,
            &args.keyword,
            &out_path,
            &retry_policy(config),
            !args.no_dedupe,
            progress,
        )?;
        println!("Wrote {} records to {}", fmt_num(written), out_path.display());
        return Ok(());
    }

    let opts = harvest_options(
        config,
        out_dir,
        args.start_year,
        args.end_year,
        args.dedupe_existing,
        args.no_dedupe,
    );
    let stats = run_yearly(&source, &opts, progress)?;
    print_year_stats(&stats);
    Ok(())
}
