//! Identity-key deduplication for JSONL partition files.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use rustc_hash::FxHashSet;

use crate::record::Record;
use crate::store::{jsonl_files, read_lines};

/// Identity keys already emitted, shared between resume-time loading and
/// inline deduplication during a harvest.
#[derive(Debug, Default)]
pub struct SeenKeys(FxHashSet<String>);

impl SeenKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mark a key as seen. Returns true if it was new.
    pub fn insert(&mut self, key: String) -> bool {
        self.0.insert(key)
    }
}

/// Outcome of deduplicating one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Lines read, malformed ones included.
    pub total: usize,
    /// Records kept in the rewritten file.
    pub kept: usize,
    /// `total - kept`: duplicates plus malformed lines.
    pub duplicates: usize,
    /// Records kept despite having no identity key.
    pub missing_key: usize,
}

impl DedupStats {
    fn merge(&mut self, other: DedupStats) {
        self.total += other.total;
        self.kept += other.kept;
        self.duplicates += other.duplicates;
        self.missing_key += other.missing_key;
    }
}

/// Rewrite `path` keeping only the first occurrence of each identity key.
///
/// Records without a key are always kept. Malformed lines are dropped.
/// The rewrite goes through a sibling temp file and an atomic rename, so
/// a crash mid-compaction leaves the original intact.
pub fn dedup_file<K>(path: &Path, keyer: K) -> Result<DedupStats>
where
    K: Fn(&Record) -> Option<String>,
{
    let tmp = path.with_extension("jsonl.tmp");
    let mut stats = DedupStats::default();
    let mut seen = SeenKeys::new();

    {
        let file = fs::File::create(&tmp)
            .with_context(|| format!("creating {}", tmp.display()))?;
        let mut out = BufWriter::new(file);

        for line in read_lines(path).with_context(|| format!("reading {}", path.display()))? {
            let line = line?;
            stats.total += 1;
            let Some(record) = Record::parse(&line) else {
                continue;
            };
            match keyer(&record) {
                Some(key) => {
                    if !seen.insert(key) {
                        continue;
                    }
                }
                None => stats.missing_key += 1,
            }
            writeln!(out, "{}", record.to_line())?;
            stats.kept += 1;
        }
        out.flush()?;
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("replacing {} with deduplicated copy", path.display()))?;
    stats.duplicates = stats.total - stats.kept;
    Ok(stats)
}

/// Deduplicate a single partition file, or every `.jsonl` file directly
/// under a directory. Stats are summed across files.
pub fn dedup_path<K>(path: &Path, keyer: K) -> Result<DedupStats>
where
    K: Fn(&Record) -> Option<String>,
{
    if path.is_file() {
        return dedup_file(path, keyer);
    }
    if path.is_dir() {
        let mut stats = DedupStats::default();
        for file in jsonl_files(path)? {
            let file_stats = dedup_file(&file, &keyer)?;
            log::info!(
                "{}: kept {} of {} entries ({} duplicates)",
                file.display(),
                file_stats.kept,
                file_stats.total,
                file_stats.duplicates
            );
            stats.merge(file_stats);
        }
        return Ok(stats);
    }
    bail!("no such file or directory: {}", path.display());
}

/// Load the identity keys already present in a partition file, so a
/// resumed harvest can skip re-emitting them. Returns the key set and
/// the number of keyed entries found.
pub fn load_seen_keys<K>(path: &Path, keyer: K) -> io::Result<(SeenKeys, usize)>
where
    K: Fn(&Record) -> Option<String>,
{
    let mut seen = SeenKeys::new();
    let mut entries = 0;
    for line in read_lines(path)? {
        let line = line?;
        let Some(record) = Record::parse(&line) else {
            continue;
        };
        if let Some(key) = keyer(&record) {
            seen.insert(key);
            entries += 1;
        }
    }
    Ok((seen, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doi_key(record: &Record) -> Option<String> {
        record
            .str_field("DOI")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().to_lowercase())
    }

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, lines.join("\n") + "\n").unwrap();
        path
    }

    #[test]
    fn first_occurrence_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dumps_2020.jsonl",
            &[
                r#"{"DOI":"10.1/A","title":"first"}"#,
                r#"{"DOI":"10.1/a","title":"second"}"#,
                r#"{"DOI":"10.1/b"}"#,
            ],
        );

        let stats = dedup_file(&path, doi_key).unwrap();
        assert_eq!(
            stats,
            DedupStats {
                total: 3,
                kept: 2,
                duplicates: 1,
                missing_key: 0,
            }
        );

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("first"));
        assert!(!content.contains("second"));
    }

    #[test]
    fn idempotent_second_pass() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dumps_2020.jsonl",
            &[
                r#"{"DOI":"10.1/a"}"#,
                r#"{"DOI":"10.1/a"}"#,
                r#"{"title":"no doi"}"#,
            ],
        );

        let stats = dedup_file(&path, doi_key).unwrap();
        assert_eq!(
            stats,
            DedupStats {
                total: 3,
                kept: 2,
                duplicates: 1,
                missing_key: 1,
            }
        );
        let first_pass = fs::read_to_string(&path).unwrap();

        let stats = dedup_file(&path, doi_key).unwrap();
        let second_pass = fs::read_to_string(&path).unwrap();

        assert_eq!(first_pass, second_pass);
        assert_eq!(stats.duplicates, 0);
        assert_eq!(stats.missing_key, 1);
    }

    #[test]
    fn keyless_records_all_kept() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dumps_2020.jsonl",
            &[
                r#"{"title":"one"}"#,
                r#"{"title":"two"}"#,
                r#"{"DOI":"  ","title":"blank doi"}"#,
            ],
        );

        let stats = dedup_file(&path, doi_key).unwrap();
        assert_eq!(stats.kept, 3);
        assert_eq!(stats.missing_key, 3);
    }

    #[test]
    fn malformed_lines_counted_but_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dumps_2020.jsonl",
            &[r#"{"DOI":"10.1/a"}"#, "not json", r#"["array"]"#],
        );

        let stats = dedup_file(&path, doi_key).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.duplicates, 2);
    }

    #[test]
    fn directory_processes_all_partitions() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "dumps_2019.jsonl",
            &[r#"{"DOI":"10.1/a"}"#, r#"{"DOI":"10.1/a"}"#],
        );
        write_file(&dir, "dumps_2020.jsonl", &[r#"{"DOI":"10.1/a"}"#]);

        let stats = dedup_path(dir.path(), doi_key).unwrap();
        // Keys are tracked per file: the same DOI survives in both years.
        assert_eq!(stats.total, 3);
        assert_eq!(stats.kept, 2);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(dedup_path(&dir.path().join("nope.jsonl"), doi_key).is_err());
    }

    #[test]
    fn load_seen_keys_counts_keyed_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dumps_2020.jsonl",
            &[
                r#"{"DOI":"10.1/a"}"#,
                r#"{"DOI":"10.1/A"}"#,
                r#"{"title":"keyless"}"#,
            ],
        );

        let (seen, entries) = load_seen_keys(&path, doi_key).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(entries, 2);
    }
}
