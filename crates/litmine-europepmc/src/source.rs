use litmine_core::harvest::HarvestSource;
use litmine_core::record::Record;

use crate::api::SearchFetcher;
use crate::config::EuropePmcConfig;
use crate::key;

/// Lucene clause restricting results to a publication-year range.
pub fn pub_year_range(start_year: i32, end_year: i32) -> String {
    format!("PUB_YEAR:[{start_year} TO {end_year}]")
}

/// Europe PMC as a harvest source.
pub struct EuropePmcSource {
    config: EuropePmcConfig,
}

impl EuropePmcSource {
    pub fn new(config: EuropePmcConfig) -> Self {
        Self { config }
    }

    fn with_extra_and(&self, query: &str) -> String {
        match &self.config.extra_and {
            Some(extra) => format!("({query}) AND ({extra})"),
            None => query.to_string(),
        }
    }
}

impl HarvestSource for EuropePmcSource {
    type Fetcher = SearchFetcher;

    fn label(&self) -> &'static str {
        "europepmc"
    }

    fn year_fetcher(&self, year: i32) -> SearchFetcher {
        let query = format!("({}) AND PUB_YEAR:{year}", self.config.query);
        SearchFetcher::new(self.config.clone(), self.with_extra_and(&query))
    }

    fn query_fetcher(&self, query: &str) -> SearchFetcher {
        SearchFetcher::new(self.config.clone(), self.with_extra_and(query))
    }

    fn identity_key(&self, record: &Record) -> Option<String> {
        key::identity_key(record)
    }
}
