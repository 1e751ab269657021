//! Request building and response parsing for `/search`.

use serde_json::Value;

use litmine_core::http::{get_json, FetchError};
use litmine_core::pagination::{Page, PageFetcher};
use litmine_core::record::Record;

use crate::config::EuropePmcConfig;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetcher for one effective query. Year clauses and extra AND terms are
/// already folded into the query string; only `cursorMark` varies.
pub struct SearchFetcher {
    config: EuropePmcConfig,
    query: String,
}

impl SearchFetcher {
    pub fn new(config: EuropePmcConfig, query: String) -> Self {
        Self { config, query }
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Pull a page out of a search response. `resultList.result` holds the
/// records, `nextCursorMark` sits at the top level, `hitCount` is the
/// total. Missing pieces degrade to an empty page.
pub fn parse_page(body: &Value) -> Page {
    let records = body["resultList"]["result"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object())
                .map(|obj| Record::from_map(obj.clone()))
                .collect()
        })
        .unwrap_or_default();
    let next_cursor = body["nextCursorMark"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(String::from);
    let total_results = body["hitCount"].as_u64();
    Page {
        records,
        next_cursor,
        total_results,
    }
}

impl PageFetcher for SearchFetcher {
    fn fetch_page(&self, cursor: &str) -> Result<Page, FetchError> {
        let params: Vec<(&str, String)> = vec![
            ("query", self.query.clone()),
            ("format", "json".to_string()),
            ("resultType", self.config.result_type.clone()),
            ("pageSize", self.config.page_size.to_string()),
            ("cursorMark", cursor.to_string()),
        ];
        let body = get_json(&self.config.base_url, &params, USER_AGENT, self.config.timeout)?;
        Ok(parse_page(&body))
    }

    fn page_size(&self) -> usize {
        self.config.page_size
    }
}
