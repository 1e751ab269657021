//! litmine - literature harvesting for materials-science corpora
//!
//! Pulls bibliographic records from Crossref and Europe PMC into yearly
//! JSONL dumps, deduplicates them, and filters them down to relevant
//! results with regex keyword groups.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "litmine")]
#[command(about = "Harvest and filter bibliographic records from Crossref and Europe PMC")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./litmine.toml or ~/.config/litmine/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest yearly dumps or ad-hoc keyword queries from a source
    Harvest(cmd::harvest::HarvestArgs),
    /// Remove duplicate records from dump files
    Dedup(cmd::dedup::DedupArgs),
    /// Filter dumps into result files with regex keyword groups
    Filter(cmd::filter::FilterArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = litmine_core::ProgressContext::new();

    // TTY: bars show activity, so default to warn. Non-TTY: logs are the
    // only progress indicator, keep info.
    let quiet = progress.is_tty() && !cli.debug;
    litmine_core::init_logging(quiet, cli.debug, &progress);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Harvest(args) => cmd::harvest::run(args, &config, &progress),
        Command::Dedup(args) => cmd::dedup::run(args),
        Command::Filter(args) => cmd::filter::run(args, &config),
        Command::Config => {
            cmd::print_config(&config);
            Ok(())
        }
    }
}
