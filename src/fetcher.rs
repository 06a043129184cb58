//! HTTP page fetching with bounded retries.

use crate::config::ScrapingConfig;
use crate::console::Console;
use crate::error::FetchError;
use crate::pacing::{Pacer, RetryPolicy, retry_async};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Source of raw page HTML.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `url` and returns its body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Builds the HTTP client shared by page fetches.
pub fn create_http_client(config: &ScrapingConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout_sec))
        .build()
}

/// Single-attempt HTTP GET. Non-success statuses become
/// [`FetchError::Status`].
pub struct HttpFetcher {
    client: reqwest::Client,
    debug: bool,
    console: Console,
}

impl HttpFetcher {
    /// Creates a fetcher from the scraping settings.
    pub fn new(config: &ScrapingConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_http_client(config)?,
            debug: config.debug,
            console: Console::new(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if self.debug {
            self.console.info(&self.console.muted(&format!("GET {}", url)));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}

/// Retries transient failures of an inner fetcher.
///
/// Terminal errors (such as 404) are returned as-is after one attempt. When
/// every attempt fails transiently the result is
/// [`FetchError::RetriesExhausted`] carrying the last error.
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
    pacer: Arc<dyn Pacer>,
    console: Console,
}

impl<F: PageFetcher> RetryingFetcher<F> {
    /// Wraps `inner` with the given retry policy.
    pub fn new(inner: F, policy: RetryPolicy, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            inner,
            policy,
            pacer,
            console: Console::new(),
        }
    }

    /// The wrapped fetcher.
    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let max_attempts = self.policy.max_attempts();
        let retried = retry_async(
            self.policy,
            self.pacer.as_ref(),
            move |e: &FetchError| {
                let transient = e.is_transient();
                if transient {
                    self.console.warning(&format!("{} (retrying)", e));
                }
                transient
            },
            move |attempt| {
                if attempt > 1 {
                    self.console
                        .info(&format!("[{}/{}] GET {}", attempt, max_attempts, url));
                }
                self.inner.fetch(url)
            },
        )
        .await;

        match retried.result {
            Ok(body) => Ok(body),
            Err(e) if e.is_transient() => Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts: retried.attempts,
                last: Box::new(e),
            }),
            Err(e) => Err(e),
        }
    }
}
