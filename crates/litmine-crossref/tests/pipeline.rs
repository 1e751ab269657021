//! Dump -> dedup -> filter pipeline over on-disk yearly partitions.

use std::fs;

use tempfile::TempDir;

use litmine_core::dedup::dedup_path;
use litmine_core::relevance::FilterConfig;
use litmine_crossref::{filter_dumps, identity_key};

fn write_dump(dir: &TempDir, name: &str, lines: &[&str]) {
    fs::write(dir.path().join(name), lines.join("\n") + "\n").unwrap();
}

#[test]
fn dedup_then_filter_yearly_dumps() {
    let dumps = TempDir::new().unwrap();
    write_dump(
        &dumps,
        "dumps_2019.jsonl",
        &[
            r#"{"DOI":"10.1/a","title":["Lithium battery cathode"],"abstract":"solid electrolyte"}"#,
            r#"{"DOI":"10.1/A","title":["duplicate, case-folded DOI"]}"#,
            r#"{"DOI":"10.1/b","title":["Perovskite solar cells"]}"#,
        ],
    );
    write_dump(
        &dumps,
        "dumps_2020.jsonl",
        &[
            r#"{"DOI":"10.1/c","title":["Anode coatings for lithium cells"]}"#,
            r#"{"title":["no doi, still a battery paper on lithium"]}"#,
        ],
    );

    let stats = dedup_path(dumps.path(), identity_key).unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.kept, 4);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.missing_key, 1);

    let results = TempDir::new().unwrap();
    let filter = FilterConfig::from_json(r#"{"groups":{"kw":["lithium"]},"scope":"combined"}"#)
        .compile()
        .unwrap();
    let stats = filter_dumps(dumps.path(), results.path(), &filter).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.kept, 3);

    let kept_2019 = fs::read_to_string(results.path().join("results_2019.jsonl")).unwrap();
    assert_eq!(kept_2019.lines().count(), 1);
    assert!(kept_2019.contains("10.1/a"));

    let kept_2020 = fs::read_to_string(results.path().join("results_2020.jsonl")).unwrap();
    assert_eq!(kept_2020.lines().count(), 2);
}

#[test]
fn idempotent_dedup_over_directory() {
    let dumps = TempDir::new().unwrap();
    write_dump(
        &dumps,
        "dumps_2021.jsonl",
        &[r#"{"DOI":"10.1/x"}"#, r#"{"DOI":"10.1/x"}"#],
    );

    dedup_path(dumps.path(), identity_key).unwrap();
    let once = fs::read_to_string(dumps.path().join("dumps_2021.jsonl")).unwrap();
    let stats = dedup_path(dumps.path(), identity_key).unwrap();
    let twice = fs::read_to_string(dumps.path().join("dumps_2021.jsonl")).unwrap();

    assert_eq!(once, twice);
    assert_eq!(stats.duplicates, 0);
}
