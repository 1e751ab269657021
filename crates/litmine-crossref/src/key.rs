use litmine_core::record::Record;

/// Identity of a Crossref work: its DOI, lowercased and trimmed.
/// Checks `DOI` first, then `doi`; a record with neither (or with an
/// empty value) has no identity.
pub fn identity_key(record: &Record) -> Option<String> {
    let doi = record
        .str_field("DOI")
        .filter(|s| !s.is_empty())
        .or_else(|| record.str_field("doi").filter(|s| !s.is_empty()))
        .unwrap_or("");
    let doi = doi.trim().to_lowercase();
    (!doi.is_empty()).then_some(doi)
}
