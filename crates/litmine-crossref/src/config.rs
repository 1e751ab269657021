use std::time::Duration;

/// Connection settings for the Crossref works endpoint.
#[derive(Debug, Clone)]
pub struct CrossrefConfig {
    pub base_url: String,
    /// Bibliographic query sent with every request.
    pub query: String,
    /// Contact address for the polite pool. Empty disables it.
    pub mailto: String,
    pub app_name: String,
    pub app_version: String,
    /// Comma-separated field list returned per work.
    pub select: String,
    /// Page size; Crossref caps this at 1000.
    pub rows: usize,
    pub timeout: Duration,
    /// Additional `filter` pairs, e.g. `("type", "journal-article")`.
    pub extra_filters: Vec<(String, String)>,
}

impl Default for CrossrefConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.crossref.org/works".to_string(),
            query: String::new(),
            mailto: String::new(),
            app_name: env!("CARGO_PKG_NAME").to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            select: "DOI,publisher,title,license,abstract".to_string(),
            rows: 1000,
            timeout: Duration::from_secs(60),
            extra_filters: Vec::new(),
        }
    }
}

impl CrossrefConfig {
    /// Polite-pool user agent, `name/version (mailto:addr)`.
    pub fn user_agent(&self) -> String {
        if self.mailto.is_empty() {
            format!("{}/{}", self.app_name, self.app_version)
        } else {
            format!("{}/{} (mailto:{})", self.app_name, self.app_version, self.mailto)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_includes_mailto_when_set() {
        let mut config = CrossrefConfig::default();
        assert!(!config.user_agent().contains("mailto"));
        config.mailto = "me@example.org".to_string();
        assert!(config.user_agent().ends_with("(mailto:me@example.org)"));
    }
}
