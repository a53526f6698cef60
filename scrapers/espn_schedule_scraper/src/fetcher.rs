use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::{
    future::Future,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::ScrapingConfig,
    error::{FetchError, ScraperError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Upper bound on the whole fetch, including every retry and backoff.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        crate::config::RetryConfig::default().policy()
    }
}

/// Anything that can turn a URL into page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

/// Runs `operation` until it succeeds, the attempt budget is spent or the deadline passes.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let started = Instant::now();
    let max_attempts = policy.max_attempts.max(1);
    let mut delay = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        let remaining = policy.deadline.checked_sub(started.elapsed()).unwrap_or_default();
        if remaining.is_zero() {
            return Err(FetchError::DeadlineExceeded {
                url: url.to_string(),
                attempts: attempt,
            });
        }
        attempt += 1;

        let result = match tokio::time::timeout(remaining, operation()).await {
            Ok(result) => result,
            Err(_) => {
                return Err(FetchError::DeadlineExceeded {
                    url: url.to_string(),
                    attempts: attempt,
                })
            }
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    debug!(url, attempt, "Request succeeded after retrying");
                }
                return Ok(value);
            }
            Err(e) => {
                if attempt >= max_attempts {
                    return Err(FetchError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                if started.elapsed() + delay >= policy.deadline {
                    return Err(FetchError::DeadlineExceeded {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                warn!(url, attempt, max_attempts, error = %e, "Request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_backoff);
            }
        }
    }
}

/// Fetcher backed by a shared reqwest client with a fixed browser-like identity.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(config: &ScrapingConfig, retry: RetryPolicy) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::Config(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::Config(format!("invalid value for header {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(FetchError::from)?;

        Ok(Self { client, retry })
    }

    async fn get_once(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get_once(url).await?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get_once(url).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Raw body download, used for logo images.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        retry_with_backoff(&self.retry, url, || self.get_bytes(url)).await
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let html = retry_with_backoff(&self.retry, url, || self.get_text(url)).await?;
        info!(url, bytes = html.len(), "Fetched page");
        Ok(html)
    }
}
