use std::time::Duration;

/// Connection settings for the Europe PMC search endpoint.
#[derive(Debug, Clone)]
pub struct EuropePmcConfig {
    pub base_url: String,
    /// Base query; year clauses are AND'ed onto it per partition.
    pub query: String,
    /// `core` for abstracts and full-text metadata, `lite` for ids only.
    pub result_type: String,
    pub page_size: usize,
    pub timeout: Duration,
    /// Extra clause AND'ed onto every query, parenthesized.
    pub extra_and: Option<String>,
}

impl Default for EuropePmcConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebi.ac.uk/europepmc/webservices/rest/search".to_string(),
            query: String::new(),
            result_type: "core".to_string(),
            page_size: 1000,
            timeout: Duration::from_secs(60),
            extra_and: None,
        }
    }
}
