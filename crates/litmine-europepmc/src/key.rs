use litmine_core::record::Record;

/// Layered identity of a Europe PMC record.
///
/// Prefers the DOI (`doi` then `DOI`, lowercased and trimmed), falls back
/// to the Europe PMC id (e.g. `MED:1234567`), and as a last resort hashes
/// the title so even id-less records deduplicate stably across runs.
/// Every record gets a key; the prefixes keep the namespaces disjoint.
pub fn identity_key(record: &Record) -> Option<String> {
    let doi = record
        .str_field("doi")
        .filter(|s| !s.is_empty())
        .or_else(|| record.str_field("DOI").filter(|s| !s.is_empty()))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    if let Some(doi) = doi {
        return Some(format!("doi:{doi}"));
    }

    let id = record
        .str_field("id")
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(id) = id {
        return Some(format!("id:{id}"));
    }

    let title = record.text_field("title");
    Some(format!("title:{}", blake3::hash(title.as_bytes()).to_hex()))
}
