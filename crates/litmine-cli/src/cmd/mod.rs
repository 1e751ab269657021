pub mod dedup;
pub mod filter;
pub mod harvest;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use crate::config::Config;

/// Which harvesting source a command operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Source {
    Crossref,
    Europepmc,
}

pub(crate) fn stats_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

pub fn print_config(config: &Config) {
    let mut table = stats_table(&["Setting", "Value"]);
    table.add_row(vec![
        "Output directory",
        &config.output.default_dir.display().to_string(),
    ]);
    table.add_row(vec!["Request timeout (s)", &config.http.timeout.to_string()]);
    table.add_row(vec![
        "Page delay (ms)",
        &config.http.page_delay_ms.to_string(),
    ]);
    table.add_row(vec![
        "Restart threshold",
        &config.http.restart_threshold.to_string(),
    ]);
    table.add_row(vec!["Crossref endpoint", &config.crossref.base_url]);
    table.add_row(vec![
        "Crossref mailto",
        config.crossref.mailto.as_deref().unwrap_or("(not set)"),
    ]);
    table.add_row(vec!["Crossref rows", &config.crossref.rows.to_string()]);
    table.add_row(vec!["Europe PMC endpoint", &config.europepmc.base_url]);
    table.add_row(vec![
        "Europe PMC page size",
        &config.europepmc.page_size.to_string(),
    ]);
    println!("{table}");
}
