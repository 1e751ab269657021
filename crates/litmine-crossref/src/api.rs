//! Request building and response parsing for the works endpoint.

use serde_json::Value;

use litmine_core::http::{get_json, FetchError};
use litmine_core::pagination::{Page, PageFetcher};
use litmine_core::record::Record;

use crate::config::CrossrefConfig;

/// Fetcher for one query against `/works`. The filter string (date range
/// and any extra pairs) is fixed at construction; only the cursor varies.
pub struct WorksFetcher {
    config: CrossrefConfig,
    filter: Option<String>,
}

impl WorksFetcher {
    /// Fetcher with no date restriction, optionally carrying the
    /// configured extra filter pairs.
    pub fn new(config: CrossrefConfig) -> Self {
        let filter = join_filters(&config.extra_filters);
        Self { config, filter }
    }

    /// Fetcher restricted to works published within one calendar year.
    pub fn for_year(config: CrossrefConfig, year: i32) -> Self {
        let mut pairs = vec![
            ("from-pub-date".to_string(), format!("{year}-01-01")),
            ("until-pub-date".to_string(), format!("{year}-12-31")),
        ];
        pairs.extend(config.extra_filters.iter().cloned());
        let filter = join_filters(&pairs);
        Self { config, filter }
    }
}

fn join_filters(pairs: &[(String, String)]) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(","),
    )
}

/// Pull a page out of a works response. Missing or oddly-typed parts of
/// the body degrade to an empty page rather than an error; an empty
/// next-cursor counts as absent.
pub fn parse_page(body: &Value) -> Page {
    let message = &body["message"];
    let records = message["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object())
                .map(|obj| Record::from_map(obj.clone()))
                .collect()
        })
        .unwrap_or_default();
    let next_cursor = message["next-cursor"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(String::from);
    let total_results = message["total-results"].as_u64();
    Page {
        records,
        next_cursor,
        total_results,
    }
}

impl PageFetcher for WorksFetcher {
    fn fetch_page(&self, cursor: &str) -> Result<Page, FetchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query.bibliographic", self.config.query.clone()),
            ("select", self.config.select.clone()),
            ("rows", self.config.rows.to_string()),
            ("cursor", cursor.to_string()),
        ];
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        if !self.config.mailto.is_empty() {
            params.push(("mailto", self.config.mailto.clone()));
        }

        let body = get_json(
            &self.config.base_url,
            &params,
            &self.config.user_agent(),
            self.config.timeout,
        )?;
        Ok(parse_page(&body))
    }

    fn page_size(&self) -> usize {
        self.config.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_page_extracts_items_and_cursor() {
        let body = json!({
            "status": "ok",
            "message": {
                "total-results": 12345,
                "next-cursor": "AoJ/abc",
                "items": [
                    {"DOI": "10.1/a", "title": ["Cathode work"]},
                    {"DOI": "10.1/b"}
                ]
            }
        });
        let page = parse_page(&body);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.next_cursor.as_deref(), Some("AoJ/abc"));
        assert_eq!(page.total_results, Some(12345));
        assert_eq!(page.records[0].str_field("DOI"), Some("10.1/a"));
    }

    #[test]
    fn empty_cursor_counts_as_absent() {
        let body = json!({"message": {"next-cursor": "", "items": []}});
        let page = parse_page(&body);
        assert!(page.next_cursor.is_none());
        assert!(page.records.is_empty());
    }

    #[test]
    fn malformed_body_degrades_to_empty_page() {
        let page = parse_page(&json!({"message": "rate limit"}));
        assert!(page.records.is_empty());
        assert!(page.next_cursor.is_none());
        // Non-object items are skipped, objects survive.
        let body = json!({"message": {"items": [1, "two", {"DOI": "10.1/c"}]}});
        assert_eq!(parse_page(&body).records.len(), 1);
    }

    #[test]
    fn year_fetcher_builds_date_filter() {
        let fetcher = WorksFetcher::for_year(CrossrefConfig::default(), 2019);
        assert_eq!(
            fetcher.filter.as_deref(),
            Some("from-pub-date:2019-01-01,until-pub-date:2019-12-31")
        );

        let mut config = CrossrefConfig::default();
        config.extra_filters = vec![("type".to_string(), "journal-article".to_string())];
        let fetcher = WorksFetcher::for_year(config, 2019);
        assert_eq!(
            fetcher.filter.as_deref(),
            Some("from-pub-date:2019-01-01,until-pub-date:2019-12-31,type:journal-article")
        );

        assert!(WorksFetcher::new(CrossrefConfig::default()).filter.is_none());
    }
}
