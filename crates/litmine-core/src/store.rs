//! JSONL partition files on the local filesystem.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::record::Record;

/// Line-oriented writer for one partition file.
///
/// Every record is flushed as soon as it is written so that a killed
/// process leaves at most zero partial lines behind and a restart can
/// trust everything already on disk.
pub struct PartitionWriter {
    writer: BufWriter<File>,
    written: usize,
}

impl PartitionWriter {
    /// Open for appending, creating the file if it does not exist.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Create or truncate the file.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        writeln!(self.writer, "{}", record.to_line())?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    /// Records written through this writer (existing file contents excluded).
    pub fn written(&self) -> usize {
        self.written
    }
}

/// Iterate the lines of a JSONL file.
pub fn read_lines(path: &Path) -> io::Result<impl Iterator<Item = io::Result<String>>> {
    let file = File::open(path)?;
    Ok(BufReader::new(file).lines())
}

/// All `.jsonl` files directly under `dir`, sorted by path for stable
/// processing order.
pub fn jsonl_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = dir.join("*.jsonl");
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("non-UTF-8 path: {}", dir.display()))?;
    let mut files: Vec<PathBuf> = glob::glob(pattern)?.collect::<Result<_, _>>()?;
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(json: &str) -> Record {
        Record::parse(json).unwrap()
    }

    #[test]
    fn append_preserves_existing_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dumps_2020.jsonl");

        let mut w = PartitionWriter::append(&path).unwrap();
        w.write_record(&record(r#"{"DOI":"10.1/a"}"#)).unwrap();
        drop(w);

        let mut w = PartitionWriter::append(&path).unwrap();
        w.write_record(&record(r#"{"DOI":"10.1/b"}"#)).unwrap();
        assert_eq!(w.written(), 1);
        drop(w);

        let lines: Vec<String> = read_lines(&path)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec![r#"{"DOI":"10.1/a"}"#, r#"{"DOI":"10.1/b"}"#]);
    }

    #[test]
    fn create_truncates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");

        let mut w = PartitionWriter::create(&path).unwrap();
        w.write_record(&record(r#"{"id":"1"}"#)).unwrap();
        w.write_record(&record(r#"{"id":"2"}"#)).unwrap();
        drop(w);

        let mut w = PartitionWriter::create(&path).unwrap();
        w.write_record(&record(r#"{"id":"3"}"#)).unwrap();
        drop(w);

        let lines: Vec<String> = read_lines(&path)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines, vec![r#"{"id":"3"}"#]);
    }

    #[test]
    fn jsonl_files_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["dumps_2021.jsonl", "dumps_2019.jsonl", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let files = jsonl_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["dumps_2019.jsonl", "dumps_2021.jsonl"]);
    }
}
