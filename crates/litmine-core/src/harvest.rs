//! Harvest orchestration: drive a cursor stream into partition files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::dedup::{dedup_file, load_seen_keys, SeenKeys};
use crate::pagination::{CursorStream, PageFetcher, RetryPolicy};
use crate::progress::{fmt_num, ProgressContext};
use crate::record::Record;
use crate::store::PartitionWriter;

/// A harvestable API: builds per-year and per-query fetchers and assigns
/// each record its identity key.
pub trait HarvestSource {
    type Fetcher: PageFetcher;

    /// Short name used in logs and progress messages.
    fn label(&self) -> &'static str;

    fn year_fetcher(&self, year: i32) -> Self::Fetcher;

    fn query_fetcher(&self, query: &str) -> Self::Fetcher;

    fn identity_key(&self, record: &Record) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct HarvestOptions {
    pub out_dir: PathBuf,
    pub start_year: i32,
    /// Inclusive.
    pub end_year: i32,
    /// Skip records whose identity key was already written.
    pub dedupe_on_write: bool,
    /// Compact an already-existing partition file before resuming into it.
    pub dedupe_existing: bool,
    /// Entries streamed per year before taking a long pause.
    pub restart_threshold: usize,
    pub restart_pause: Duration,
    pub policy: RetryPolicy,
}

impl HarvestOptions {
    pub fn new(out_dir: PathBuf, start_year: i32, end_year: i32) -> Self {
        Self {
            out_dir,
            start_year,
            end_year,
            dedupe_on_write: true,
            dedupe_existing: false,
            restart_threshold: 100_000,
            restart_pause: Duration::from_secs(20),
            policy: RetryPolicy::default(),
        }
    }
}

/// Per-year outcome of a harvest run.
#[derive(Debug, Clone, Copy)]
pub struct YearStats {
    pub year: i32,
    /// Keyed entries already on disk before this run.
    pub existing: usize,
    /// New records appended during this run.
    pub appended: usize,
    /// Distinct identity keys after this run.
    pub unique_keys: usize,
}

/// Harvest one partition file per year in `[start_year, end_year]`,
/// resuming idempotently into existing files.
pub fn run_yearly<S: HarvestSource>(
    source: &S,
    opts: &HarvestOptions,
    progress: &ProgressContext,
) -> Result<Vec<YearStats>> {
    std::fs::create_dir_all(&opts.out_dir)
        .with_context(|| format!("creating {}", opts.out_dir.display()))?;

    let mut all_stats = Vec::new();
    for year in opts.start_year..=opts.end_year {
        all_stats.push(harvest_year(source, opts, year, progress)?);
    }
    Ok(all_stats)
}

fn harvest_year<S: HarvestSource>(
    source: &S,
    opts: &HarvestOptions,
    year: i32,
    progress: &ProgressContext,
) -> Result<YearStats> {
    let path = opts.out_dir.join(format!("dumps_{year}.jsonl"));
    let keyer = |r: &Record| source.identity_key(r);

    let (mut seen, existing) = if path.exists() {
        if opts.dedupe_existing {
            let stats = dedup_file(&path, keyer)?;
            log::info!(
                "{year}: compacted existing partition, {} duplicates removed",
                stats.duplicates
            );
        }
        let (seen, entries) = load_seen_keys(&path, keyer)
            .with_context(|| format!("loading existing keys from {}", path.display()))?;
        log::info!(
            "{year}: resuming, {} keyed entries already stored",
            fmt_num(entries)
        );
        (seen, entries)
    } else {
        (SeenKeys::new(), 0)
    };

    let fetcher = source.year_fetcher(year);
    let mut stream = CursorStream::new(&fetcher, &opts.policy);
    let mut writer = PartitionWriter::append(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    let bar = progress.partition_bar(&format!("{} {year}", source.label()));
    let mut reported_total = false;
    let mut since_pause: usize = 0;
    let mut appended: usize = 0;

    while let Some(record) = stream.next() {
        if !reported_total {
            if let Some(total) = stream.total_results() {
                log::info!("{year}: {} results reported", fmt_num(total as usize));
                reported_total = true;
            }
        }
        since_pause += 1;

        let duplicate = opts.dedupe_on_write
            && source
                .identity_key(&record)
                .is_some_and(|key| !seen.insert(key));
        if !duplicate {
            writer.write_record(&record)?;
            appended += 1;
        }

        let seen_count = stream.entries_seen();
        if seen_count % 500 == 0 {
            bar.set_message(format!(
                "{} streamed, {} appended",
                fmt_num(seen_count),
                fmt_num(appended)
            ));
        }
        if !progress.is_tty() && seen_count % 10_000 == 0 {
            log::info!(
                "{year}: {} streamed, {} appended",
                fmt_num(seen_count),
                fmt_num(appended)
            );
        }

        if since_pause >= opts.restart_threshold {
            log::info!(
                "{year}: {} entries this stretch, pausing {}s",
                fmt_num(since_pause),
                opts.restart_pause.as_secs()
            );
            std::thread::sleep(opts.restart_pause);
            since_pause = 0;
        }
    }
    bar.finish_and_clear();

    let stats = YearStats {
        year,
        existing,
        appended,
        unique_keys: seen.len(),
    };
    log::info!(
        "{year}: done, {} streamed, {} appended, {} unique keys",
        fmt_num(stream.entries_seen()),
        fmt_num(appended),
        fmt_num(stats.unique_keys)
    );
    Ok(stats)
}

/// Harvest a list of ad-hoc queries into a single file, annotating each
/// record with the query that produced it. The output is truncated, and
/// deduplication spans all queries.
pub fn run_queries<S: HarvestSource>(
    source: &S,
    queries: &[String],
    out_path: &Path,
    policy: &RetryPolicy,
    dedupe_on_write: bool,
    progress: &ProgressContext,
) -> Result<usize> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut writer = PartitionWriter::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    let mut seen = SeenKeys::new();

    for query in queries {
        let fetcher = source.query_fetcher(query);
        let mut stream = CursorStream::new(&fetcher, policy);
        let bar = progress.partition_bar(&format!("{} \"{query}\"", source.label()));
        let mut appended = 0usize;

        while let Some(mut record) = stream.next() {
            let duplicate = dedupe_on_write
                && source
                    .identity_key(&record)
                    .is_some_and(|key| !seen.insert(key));
            if duplicate {
                continue;
            }
            record.set("source_query", Value::String(query.clone()));
            writer.write_record(&record)?;
            appended += 1;
            if appended % 500 == 0 {
                bar.set_message(format!("{} appended", fmt_num(appended)));
            }
        }
        bar.finish_and_clear();
        log::info!("\"{query}\": {} records appended", fmt_num(appended));
    }
    Ok(writer.written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchError;
    use crate::pagination::Page;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Source whose fetchers replay a fixed script of pages per run.
    struct FakeSource {
        scripts: RefCell<VecDeque<Vec<Page>>>,
    }

    impl FakeSource {
        fn new(scripts: Vec<Vec<Page>>) -> Self {
            Self {
                scripts: RefCell::new(scripts.into()),
            }
        }
    }

    struct FakeFetcher {
        pages: RefCell<VecDeque<Page>>,
    }

    impl PageFetcher for FakeFetcher {
        fn fetch_page(&self, _cursor: &str) -> Result<Page, FetchError> {
            Ok(self.pages.borrow_mut().pop_front().unwrap_or_default())
        }

        fn page_size(&self) -> usize {
            10
        }
    }

    impl HarvestSource for FakeSource {
        type Fetcher = FakeFetcher;

        fn label(&self) -> &'static str {
            "fake"
        }

        fn year_fetcher(&self, _year: i32) -> FakeFetcher {
            FakeFetcher {
                pages: RefCell::new(
                    self.scripts.borrow_mut().pop_front().unwrap_or_default().into(),
                ),
            }
        }

        fn query_fetcher(&self, _query: &str) -> FakeFetcher {
            self.year_fetcher(0)
        }

        fn identity_key(&self, record: &Record) -> Option<String> {
            record.str_field("id").map(String::from)
        }
    }

    fn page_of(ids: &[&str]) -> Page {
        Page {
            records: ids
                .iter()
                .map(|id| Record::parse(&format!(r#"{{"id":"{id}","title":"t"}}"#)).unwrap())
                .collect(),
            next_cursor: None,
            total_results: Some(ids.len() as u64),
        }
    }

    fn opts(dir: &TempDir, year: i32) -> HarvestOptions {
        let mut opts = HarvestOptions::new(dir.path().to_path_buf(), year, year);
        opts.policy = RetryPolicy::no_delay();
        opts
    }

    #[test]
    fn resumed_run_appends_nothing_new() {
        let dir = TempDir::new().unwrap();
        let progress = ProgressContext::hidden();

        let source = FakeSource::new(vec![vec![page_of(&["a", "b"])]]);
        let stats = run_yearly(&source, &opts(&dir, 2020), &progress).unwrap();
        assert_eq!(stats[0].appended, 2);
        assert_eq!(stats[0].existing, 0);

        // Same payload again: everything is already keyed on disk.
        let source = FakeSource::new(vec![vec![page_of(&["a", "b"])]]);
        let stats = run_yearly(&source, &opts(&dir, 2020), &progress).unwrap();
        assert_eq!(stats[0].appended, 0);
        assert_eq!(stats[0].existing, 2);
        assert_eq!(stats[0].unique_keys, 2);

        let content = std::fs::read_to_string(dir.path().join("dumps_2020.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn inline_dedup_skips_repeats_within_a_run() {
        let dir = TempDir::new().unwrap();
        let progress = ProgressContext::hidden();

        let source = FakeSource::new(vec![vec![page_of(&["a", "a", "b"])]]);
        let stats = run_yearly(&source, &opts(&dir, 2021), &progress).unwrap();
        assert_eq!(stats[0].appended, 2);
    }

    #[test]
    fn queries_annotate_source_query() {
        let dir = TempDir::new().unwrap();
        let progress = ProgressContext::hidden();
        let out = dir.path().join("keyword_results.jsonl");

        let source = FakeSource::new(vec![
            vec![page_of(&["a"])],
            vec![page_of(&["a", "b"])],
        ]);
        let written = run_queries(
            &source,
            &["solid electrolyte".to_string(), "cathode".to_string()],
            &out,
            &RetryPolicy::no_delay(),
            true,
            &progress,
        )
        .unwrap();

        // "a" from the second query is a cross-query duplicate.
        assert_eq!(written, 2);
        let content = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].contains(r#""source_query":"solid electrolyte""#));
        assert!(lines[1].contains(r#""source_query":"cathode""#));
    }
}
