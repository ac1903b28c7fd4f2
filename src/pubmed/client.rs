use reqwest::{header, Client, Url};
use serde::Deserialize;
use tokio::time::sleep;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pubmed::paginator::Paginator;
use crate::pubmed::parser::{parse_articles, ParsedBatch};
use crate::pubmed::rate_limiter::RateLimiter;
use crate::pubmed::retry::{Failure, FailureKind, RetryPolicy};

const ESEARCH: &str = "esearch.fcgi";
const EFETCH: &str = "efetch.fcgi";

/// One page of ESearch results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    /// Total matches the server reports for the query.
    pub total: u64,
    pub ids: Vec<String>,
}

#[derive(Deserialize)]
struct ESearchResponse {
    esearchresult: Option<ESearchResult>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ESearchResult {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
    #[serde(default)]
    warninglist: Option<serde_json::Value>,
}

/// Client for the NCBI E-utilities ESearch and EFetch endpoints.
pub struct PubMedClient {
    client: Client,
    rate_limiter: RateLimiter,
    retry: RetryPolicy,
    config: ClientConfig,
}

impl PubMedClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("pubmed-affil/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.min_interval),
            retry: RetryPolicy::new(config.max_attempts, config.retry_delay),
            config,
        })
    }

    /// PubMed ids matching `query`, in server order, at most `max_results`.
    pub async fn search(&self, query: &str, max_results: u32) -> Result<Vec<String>> {
        tracing::info!("Searching PubMed for: {}", query);
        let paginator = Paginator::new(self, self.config.batch_size);
        paginator.fetch_limited(query, max_results).await
    }

    pub async fn search_page(&self, query: &str, offset: u32, size: u32) -> Result<SearchPage> {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retstart", offset.to_string()),
            ("retmax", size.to_string()),
            ("retmode", "json".to_string()),
        ];

        let body = self.get_text(ESEARCH, &params).await?;
        let response: ESearchResponse = serde_json::from_str(&body)
            .map_err(|e| Error::ParseError(format!("Failed to parse ESearch response: {}", e)))?;

        if let Some(error) = response.error {
            let reason = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(Failure::terminal(reason).into_error(1));
        }

        let Some(result) = response.esearchresult else {
            return Err(Error::ParseError(
                "ESearch response has no esearchresult".to_string(),
            ));
        };

        if let Some(error) = result.error {
            return Err(Failure::terminal(format!("query rejected: {}", error)).into_error(1));
        }

        if let Some(warnings) = result.warninglist {
            tracing::debug!("ESearch warnings for {:?}: {}", query, warnings);
        }

        let total = result
            .count
            .as_deref()
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or(0);

        Ok(SearchPage {
            total,
            ids: result.idlist,
        })
    }

    /// Fetches and parses records for `ids`, one EFetch call per batch.
    pub async fn fetch_details(&self, ids: &[String]) -> Result<ParsedBatch> {
        let mut parsed = ParsedBatch::default();

        for chunk in ids.chunks(self.config.batch_size.max(1) as usize) {
            parsed.merge(self.fetch_batch(chunk).await?);
        }

        Ok(parsed)
    }

    pub async fn fetch_batch(&self, ids: &[String]) -> Result<ParsedBatch> {
        if ids.is_empty() {
            return Ok(ParsedBatch::default());
        }

        tracing::debug!("Fetching details for {} ids", ids.len());
        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "xml".to_string()),
        ];

        let body = self.get_text(EFETCH, &params).await?;
        Ok(parse_articles(&body))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET with throttling and bounded retry. Transient failures are retried
    /// with linear backoff, a 429 is retried once after a pause, anything
    /// else fails straight away.
    async fn get_text(&self, endpoint: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let mut attempts = 0;
        let mut transient_failures = 0;
        let mut rate_limit_retried = false;

        loop {
            attempts += 1;
            self.rate_limiter.wait().await;

            let failure = match self.send_once(&url, params).await {
                Ok(body) => return Ok(body),
                Err(failure) => failure,
            };

            match failure.kind {
                FailureKind::Terminal => {
                    tracing::error!("Request to {} failed: {}", endpoint, failure.reason);
                    return Err(failure.into_error(attempts));
                }
                FailureKind::RateLimited { retry_after } => {
                    if rate_limit_retried {
                        tracing::error!("Still rate limited by {}, giving up", endpoint);
                        return Err(failure.into_error(attempts));
                    }
                    rate_limit_retried = true;
                    let pause = retry_after
                        .unwrap_or_default()
                        .max(self.rate_limiter.min_interval());
                    tracing::warn!("Rate limited by {}, retrying in {:?}", endpoint, pause);
                    self.rate_limiter.pause_for(pause).await;
                }
                FailureKind::Transient => {
                    transient_failures += 1;
                    if !self.retry.should_retry(transient_failures) {
                        tracing::error!(
                            "Request to {} failed after {} attempts: {}",
                            endpoint,
                            attempts,
                            failure.reason
                        );
                        return Err(failure.into_error(attempts));
                    }
                    let delay = self.retry.delay_for(transient_failures);
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}; retrying in {:?}",
                        endpoint,
                        transient_failures,
                        self.retry.max_attempts,
                        failure.reason,
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn send_once(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> std::result::Result<String, Failure> {
        let response = self
            .client
            .get(url)
            .query(&self.identity_params())
            .query(params)
            .send()
            .await
            .map_err(|e| Failure::from_transport(&e))?;

        let status = response.status();
        if status.is_success() {
            return response.text().await.map_err(|e| Failure::from_transport(&e));
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Err(Failure::from_status(status, &headers, &body))
    }

    /// `tool`, `email` and `api_key` parameters NCBI asks every client to send.
    fn identity_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.config.tool.clone())];
        if let Some(email) = &self.config.email {
            params.push(("email", email.clone()));
        }
        if let Some(api_key) = &self.config.api_key {
            params.push(("api_key", api_key.clone()));
        }
        params
    }
}
