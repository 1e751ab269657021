//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for litmine
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub http: HttpConfig,
    pub crossref: CrossrefSettings,
    pub europepmc: EuropePmcSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout: u64,
    /// Politeness delay between pages, in milliseconds.
    pub page_delay_ms: u64,
    /// Entries streamed per year before the long pause.
    pub restart_threshold: usize,
    /// Length of that pause, in seconds.
    pub restart_pause: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: 60,
            page_delay_ms: 1000,
            restart_threshold: 100_000,
            restart_pause: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrossrefSettings {
    pub base_url: String,
    /// Contact address for the polite pool.
    #[serde(deserialize_with = "deserialize_env_var")]
    pub mailto: Option<String>,
    pub select: String,
    pub rows: usize,
}

impl Default for CrossrefSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.crossref.org/works".to_string(),
            mailto: std::env::var("CROSSREF_MAILTO").ok(),
            select: "DOI,publisher,title,license,abstract".to_string(),
            rows: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EuropePmcSettings {
    pub base_url: String,
    pub page_size: usize,
    pub result_type: String,
}

impl Default for EuropePmcSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebi.ac.uk/europepmc/webservices/rest/search".to_string(),
            page_size: 1000,
            result_type: "core".to_string(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./litmine.toml (current directory)
    /// 2. ~/.config/litmine/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("litmine.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "litmine") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
