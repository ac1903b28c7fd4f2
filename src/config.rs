use crate::error::{Error, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_TOOL: &str = "pubmed-affil";
pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const MAX_BATCH_SIZE: u32 = 500;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// NCBI allows 3 requests per second without an API key and 10 with one.
const INTERVAL_WITHOUT_KEY: Duration = Duration::from_millis(340);
const INTERVAL_WITH_KEY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: String,
    pub base_url: String,
    pub batch_size: u32,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = non_empty_var("NCBI_API_KEY");
        let email = non_empty_var("NCBI_EMAIL");

        let tool = non_empty_var("NCBI_TOOL").unwrap_or_else(|| DEFAULT_TOOL.to_string());

        let base_url =
            non_empty_var("PUBMED_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let batch_size = parse_var("PUBMED_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let max_retries = parse_var("PUBMED_MAX_RETRIES", DEFAULT_MAX_RETRIES)?;
        let retry_delay_ms = parse_var("PUBMED_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?;
        let timeout_secs = parse_var("PUBMED_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            api_key,
            email,
            tool,
            base_url,
            batch_size,
            max_retries,
            retry_delay_ms,
            timeout_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            tool: DEFAULT_TOOL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match non_empty_var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a non-negative integer, got {:?}", name, raw))),
        None => Ok(default),
    }
}

/// Settings for a single `PubMedClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub email: Option<String>,
    pub tool: String,
    /// Ids per ESearch page and per EFetch batch.
    pub batch_size: u32,
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
    /// Minimum spacing between consecutive requests.
    pub min_interval: Duration,
}

impl ClientConfig {
    pub fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::from(&Config::default())
    }
}

impl From<&Config> for ClientConfig {
    fn from(config: &Config) -> Self {
        let min_interval = if config.api_key.is_some() {
            INTERVAL_WITH_KEY
        } else {
            INTERVAL_WITHOUT_KEY
        };

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            email: config.email.clone(),
            tool: config.tool.clone(),
            batch_size: config.batch_size.clamp(1, MAX_BATCH_SIZE),
            max_attempts: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            timeout: Duration::from_secs(config.timeout_secs),
            min_interval,
        }
    }
}
