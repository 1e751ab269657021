use litmine_core::harvest::HarvestSource;
use litmine_core::record::Record;

use crate::api::WorksFetcher;
use crate::config::CrossrefConfig;
use crate::key;

/// Crossref as a harvest source: one query, per-year or ad-hoc fetchers.
pub struct CrossrefSource {
    config: CrossrefConfig,
}

impl CrossrefSource {
    pub fn new(config: CrossrefConfig) -> Self {
        Self { config }
    }
}

impl HarvestSource for CrossrefSource {
    type Fetcher = WorksFetcher;

    fn label(&self) -> &'static str {
        "crossref"
    }

    fn year_fetcher(&self, year: i32) -> WorksFetcher {
        WorksFetcher::for_year(self.config.clone(), year)
    }

    fn query_fetcher(&self, query: &str) -> WorksFetcher {
        let mut config = self.config.clone();
        config.query = query.to_string();
        WorksFetcher::new(config)
    }

    fn identity_key(&self, record: &Record) -> Option<String> {
        key::identity_key(record)
    }
}
