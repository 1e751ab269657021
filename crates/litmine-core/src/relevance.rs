//! Regex relevance filtering of harvested partitions.
//!
//! A filter is a conjunction of keyword groups: a record is relevant when
//! every group has at least one pattern matching the selected text scope.
//! Patterns within a group are alternatives.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::dedup::SeenKeys;
use crate::record::Record;
use crate::store::{jsonl_files, read_lines, PartitionWriter};

/// Which record text the patterns run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    Title,
    Abstract,
    /// Title alone or abstract alone must satisfy every group.
    #[default]
    Field,
    /// Title and abstract concatenated, evaluated once.
    Combined,
}

impl Scope {
    /// Missing or empty scope means [`Scope::Field`]; any unrecognized
    /// value falls back to [`Scope::Combined`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Scope::Field,
            Some("title") => Scope::Title,
            Some("abstract") => Scope::Abstract,
            Some("field") => Scope::Field,
            Some(_) => Scope::Combined,
        }
    }
}

/// Filter definition: named keyword groups plus a match scope.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub groups: Vec<(String, Vec<String>)>,
    pub scope: Scope,
}

impl FilterConfig {
    /// Build from a JSON object of the shape
    /// `{"groups": {"name": ["pat", ...]}, "scope": "combined"}`.
    /// A group whose value is a single string is treated as one pattern;
    /// groups with non-list values and non-string patterns are skipped.
    /// Anything else malformed yields a no-groups config, which matches
    /// nothing.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let scope = Scope::parse(obj.get("scope").and_then(Value::as_str));
        let mut groups = Vec::new();
        if let Some(groups_obj) = obj.get("groups").and_then(Value::as_object) {
            for (name, patterns) in groups_obj {
                let patterns: Vec<String> = match patterns {
                    Value::String(p) => vec![p.clone()],
                    Value::Array(items) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect(),
                    _ => continue,
                };
                groups.push((name.clone(), patterns));
            }
        }
        Self { groups, scope }
    }

    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Value>(json) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    /// Compile every pattern case-insensitively. An invalid pattern is a
    /// configuration error, not a skipped group.
    pub fn compile(&self) -> std::result::Result<CompiledFilter, regex::Error> {
        let mut groups = Vec::with_capacity(self.groups.len());
        for (name, patterns) in &self.groups {
            let compiled: Vec<Regex> = patterns
                .iter()
                .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
                .collect::<std::result::Result<_, _>>()?;
            groups.push((name.clone(), compiled));
        }
        Ok(CompiledFilter {
            groups,
            scope: self.scope,
        })
    }
}

pub struct CompiledFilter {
    groups: Vec<(String, Vec<Regex>)>,
    scope: Scope,
}

impl CompiledFilter {
    /// AND across groups, OR within a group. A filter with no groups, or
    /// an empty text, matches nothing.
    pub fn text_matches(&self, text: &str) -> bool {
        if self.groups.is_empty() || text.is_empty() {
            return false;
        }
        self.groups
            .iter()
            .all(|(_, patterns)| patterns.iter().any(|p| p.is_match(text)))
    }

    pub fn matches(&self, title: &str, abstract_text: &str) -> bool {
        match self.scope {
            Scope::Title => self.text_matches(title),
            Scope::Abstract => self.text_matches(abstract_text),
            Scope::Field => self.text_matches(title) || self.text_matches(abstract_text),
            Scope::Combined => {
                let combined: Vec<&str> = [title, abstract_text]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect();
                self.text_matches(&combined.join(" "))
            }
        }
    }
}

/// Source-specific names of the title and abstract fields.
#[derive(Debug, Clone, Copy)]
pub struct TextFields {
    pub title: &'static str,
    pub abstract_text: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Parsed records examined (malformed lines are not counted here).
    pub total: usize,
    pub kept: usize,
}

impl FilterStats {
    fn merge(&mut self, other: FilterStats) {
        self.total += other.total;
        self.kept += other.kept;
    }
}

/// Filter one partition file into `out_path`, deduplicating on write.
///
/// `gate` is an optional source-specific predicate checked before the
/// regex filter (e.g. full-text availability). The output is truncated,
/// never appended.
pub fn filter_file<K, G>(
    in_path: &Path,
    out_path: &Path,
    filter: &CompiledFilter,
    fields: TextFields,
    keyer: K,
    gate: Option<G>,
) -> Result<FilterStats>
where
    K: Fn(&Record) -> Option<String>,
    G: Fn(&Record) -> bool,
{
    let mut stats = FilterStats::default();
    let mut seen = SeenKeys::new();
    let mut writer = PartitionWriter::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;

    for line in read_lines(in_path).with_context(|| format!("reading {}", in_path.display()))? {
        let line = line?;
        let Some(record) = Record::parse(&line) else {
            continue;
        };
        stats.total += 1;

        if let Some(gate) = &gate {
            if !gate(&record) {
                continue;
            }
        }
        let title = record.text_field(fields.title);
        let abstract_text = record.text_field(fields.abstract_text);
        if !filter.matches(&title, &abstract_text) {
            continue;
        }
        if let Some(key) = keyer(&record) {
            if !seen.insert(key) {
                continue;
            }
        }
        writer.write_record(&record)?;
        stats.kept += 1;
    }
    Ok(stats)
}

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{4})").unwrap());

/// First 4-digit run in a filename, or "unknown".
pub fn year_token(filename: &str) -> &str {
    YEAR_RE
        .find(filename)
        .map(|m| m.as_str())
        .unwrap_or("unknown")
}

/// `dumps_2020.jsonl` -> `results_2020.jsonl`.
pub fn results_name(in_path: &Path) -> String {
    let filename = in_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    format!("results_{}.jsonl", year_token(filename))
}

/// Filter every `.jsonl` partition under `in_dir` into `out_dir`, naming
/// each output after the year token of its input.
pub fn filter_dir<K, G>(
    in_dir: &Path,
    out_dir: &Path,
    filter: &CompiledFilter,
    fields: TextFields,
    keyer: K,
    gate: Option<G>,
) -> Result<FilterStats>
where
    K: Fn(&Record) -> Option<String>,
    G: Fn(&Record) -> bool + Copy,
{
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut stats = FilterStats::default();
    for in_path in jsonl_files(in_dir)? {
        let out_path: PathBuf = out_dir.join(results_name(&in_path));
        let file_stats = filter_file(&in_path, &out_path, filter, fields, &keyer, gate)?;
        log::info!(
            "{}: kept {} of {} entries",
            in_path.display(),
            file_stats.kept,
            file_stats.total
        );
        stats.merge(file_stats);
    }
    Ok(stats)
}
