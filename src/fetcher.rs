use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::fetch_error::FetchError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Downloads an issuer's annual results page (`{base_url}/{ticker}/kessan`).
///
/// Transient failures are retried with exponential backoff, and every
/// successful fetch is followed by a politeness delay.
#[derive(Clone)]
pub struct KessanFetcher {
    client: reqwest::Client,
    base_url: String,
    request_delay: Duration,
    max_retries: usize,
    retry_min_delay: Duration,
}

impl KessanFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_delay: Duration::from_secs(1),
            max_retries: 3,
            retry_min_delay: Duration::from_millis(500),
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_min_delay(mut self, delay: Duration) -> Self {
        self.retry_min_delay = delay;
        self
    }

    pub fn page_url(&self, ticker: &str) -> String {
        format!("{}/{}/kessan", self.base_url, ticker)
    }

    /// Fetch the results page body for `ticker`.
    #[instrument(skip(self), fields(url = %self.page_url(ticker)))]
    pub async fn fetch_document(&self, ticker: &str) -> Result<String, FetchError> {
        let url = self.page_url(ticker);
        let url = url.as_str();

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.retry_min_delay)
            .with_max_times(self.max_retries)
            .with_jitter();

        let html = (|| async move { self.fetch_once(url).await })
            .retry(backoff)
            .when(|e: &FetchError| e.is_transient())
            .notify(|e: &FetchError, delay: Duration| {
                warn!("Fetch of {} failed ({}), retrying in {:?}", url, e, delay);
            })
            .await?;

        if !self.request_delay.is_zero() {
            debug!("Waiting {:?} before next request", self.request_delay);
            tokio::time::sleep(self.request_delay).await;
        }

        Ok(html)
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        debug!("Sending HTTP request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("Received HTTP response with status: {}", status);

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        debug!("Retrieved HTML content, size: {} bytes", html.len());
        Ok(html)
    }
}
