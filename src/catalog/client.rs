use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use url::Url;

use super::types::{ApiPage, CatalogError, Character};
use super::CatalogClient;

/// Public catalog endpoint used when no override is configured.
pub const DEFAULT_BASE_URL: &str = "https://rickandmortyapi.com/api";

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Check that a catalog base URL is well formed and safe to talk to.
///
/// HTTPS is required; plain HTTP is accepted only for `localhost` and
/// `127.0.0.1` so tests can point at a local mock server.
pub fn validate_base_url(base: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(base).map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;
    match url.scheme() {
        "https" => Ok(url),
        "http" => match url.host_str() {
            Some("localhost") | Some("127.0.0.1") => {
                tracing::warn!(base_url = %base, "Using non-HTTPS catalog base URL (localhost only)");
                Ok(url)
            }
            _ => {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS catalog base URL");
                Err(CatalogError::InsecureBaseUrl)
            }
        },
        other => Err(CatalogError::InvalidBaseUrl(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}

/// [`CatalogClient`] backed by the catalog's REST endpoints.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpCatalogClient {
    /// Build a client for `base_url` (e.g. [`DEFAULT_BASE_URL`]).
    ///
    /// # Errors
    ///
    /// Fails if the base URL is malformed or not HTTPS, or if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, CatalogError> {
        let parsed = validate_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("roster/", env!("CARGO_PKG_VERSION")))
            .build()?;

        if base_url != DEFAULT_BASE_URL {
            tracing::info!(base_url = %parsed, "Using custom catalog base URL");
        }

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            timeout,
            max_retries,
            retry_base_delay: Duration::from_secs(1),
        })
    }

    /// Override the first backoff delay (doubles on each retry).
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn page_url(&self, page: u32) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&format!("{}/character", self.base_url))
            .map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());
        Ok(url)
    }

    fn search_url(&self, term: &str) -> Result<Url, CatalogError> {
        let mut url = Url::parse(&format!("{}/character/", self.base_url))
            .map_err(|e| CatalogError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("name", term);
        Ok(url)
    }

    /// GET a list endpoint, retrying transient failures with exponential
    /// backoff (base, 2x base, 4x base, ...).
    async fn get_with_retry(&self, url: &Url) -> Result<Option<ApiPage>, CatalogError> {
        let mut retry_count = 0;

        loop {
            match self.get_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && retry_count < self.max_retries => {
                    let delay = self.retry_base_delay * (1u32 << retry_count.min(10));
                    tracing::debug!(
                        error = %e,
                        url = %url,
                        retry = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying catalog request after transient error"
                    );
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single GET bounded by the configured timeout.
    async fn get_once(&self, url: &Url) -> Result<Option<ApiPage>, CatalogError> {
        tokio::time::timeout(self.timeout, self.send(url))
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout.as_secs()))?
    }

    /// `Ok(None)` means the endpoint answered 404.
    async fn send(&self, url: &Url) -> Result<Option<ApiPage>, CatalogError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::HttpStatus(status.as_u16()));
        }
        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        let page: ApiPage = serde_json::from_slice(&body)?;
        Ok(Some(page))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Character>, CatalogError> {
        let url = self.page_url(page.max(1))?;
        tracing::debug!(page, url = %url, "Fetching catalog page");
        match self.get_with_retry(&url).await? {
            Some(body) => Ok(body.results),
            None => Err(CatalogError::NotFound(page)),
        }
    }

    async fn search(&self, term: &str) -> Result<Vec<Character>, CatalogError> {
        let url = self.search_url(term)?;
        tracing::debug!(term = %term, url = %url, "Searching catalog");
        match self.get_with_retry(&url).await? {
            Some(body) => Ok(body.results),
            None => Err(CatalogError::NoMatches(term.to_string())),
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, CatalogError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(CatalogError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(CatalogError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
