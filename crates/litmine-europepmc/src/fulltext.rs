use litmine_core::record::Record;

/// Whether a record appears to have a retrievable full text.
///
/// Signals, in order: a non-empty `fullTextIdList.fullTextId` list, a
/// `pmcid` value, or `inEPMC`/`inPMC` set to `Y` (case-insensitive).
pub fn has_full_text(record: &Record) -> bool {
    let full_text_ids = record
        .raw("fullTextIdList")
        .and_then(|ft| ft.get("fullTextId"))
        .and_then(|ids| ids.as_array());
    if full_text_ids.is_some_and(|ids| !ids.is_empty()) {
        return true;
    }
    if record.str_field("pmcid").is_some_and(|s| !s.is_empty()) {
        return true;
    }
    ["inEPMC", "inPMC"].iter().any(|field| {
        record
            .str_field(field)
            .is_some_and(|v| v.eq_ignore_ascii_case("Y"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> Record {
        Record::parse(json).unwrap()
    }

    #[test]
    fn full_text_id_list_counts() {
        assert!(has_full_text(&record(
            r#"{"fullTextIdList":{"fullTextId":["PMC123"]}}"#
        )));
        assert!(!has_full_text(&record(
            r#"{"fullTextIdList":{"fullTextId":[]}}"#
        )));
    }

    #[test]
    fn pmcid_counts() {
        assert!(has_full_text(&record(r#"{"pmcid":"PMC123"}"#)));
        assert!(!has_full_text(&record(r#"{"pmcid":""}"#)));
    }

    #[test]
    fn epmc_flags_count_case_insensitively() {
        assert!(has_full_text(&record(r#"{"inEPMC":"Y"}"#)));
        assert!(has_full_text(&record(r#"{"inPMC":"y"}"#)));
        assert!(!has_full_text(&record(r#"{"inEPMC":"N"}"#)));
        assert!(!has_full_text(&record("{}")));
    }
}
