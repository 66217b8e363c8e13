//! HTTP transport used by the listing aggregator and the article fetcher.
//!
//! # Architecture
//!
//! - [`HttpFetch`]: core trait, one request in, status and body out
//! - [`ReqwestFetch`]: production implementation over a shared `reqwest::Client`
//! - [`RetryFetch`]: decorator that adds retry logic to any `HttpFetch`
//!
//! Non-success statuses are returned as responses, not errors; callers decide
//! what a status means for them.
//!
//! # Retry Strategy
//!
//! `RetryFetch` retries transport errors and 5xx responses only:
//! - Exponential backoff from a configurable base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use rand::{Rng, rng};
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.push((key.to_string(), value.into()));
        self
    }
}

#[cfg(test)]
impl HttpRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// The parts of an HTTP response the core inspects.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Trait for issuing HTTP requests.
///
/// Implementors must report failures to obtain a response (connect errors,
/// timeouts, interrupted bodies) as [`Error::Transport`].
pub trait HttpFetch {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// [`HttpFetch`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
}

impl ReqwestFetch {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the configured timeout and user agent.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client))
    }
}

impl HttpFetch for ReqwestFetch {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let t0 = Instant::now();
        let transport = |source| Error::Transport {
            url: request.url.clone(),
            source,
        };

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(transport)?.to_vec();

        debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "HTTP response"
        );
        Ok(HttpResponse { status, body })
    }
}

impl<T: HttpFetch> HttpFetch for &T {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).fetch(request).await
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`HttpFetch`].
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: HttpFetch,
{
    /// Wrap `inner`. With `max_retries == 0` every request is tried once.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> HttpFetch for RetryFetch<T>
where
    T: HttpFetch,
{
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let outcome = self.inner.fetch(request).await;
            let retryable = match &outcome {
                Ok(resp) => resp.status.is_server_error(),
                Err(e) => matches!(e, Error::Transport { .. }),
            };
            if !retryable {
                return outcome;
            }

            attempt += 1;
            let total_dt = total_t0.elapsed();
            if attempt > self.max_retries {
                if self.max_retries > 0 {
                    error!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        "fetch exhausted retries"
                    );
                }
                return outcome;
            }

            let delay = self.delay_for(attempt);
            match &outcome {
                Ok(resp) => warn!(
                    attempt,
                    max = self.max_retries,
                    status = %resp.status,
                    ?delay,
                    "server error; backing off"
                ),
                Err(e) => warn!(
                    attempt,
                    max = self.max_retries,
                    ?delay,
                    error = %e,
                    "fetch attempt failed; backing off"
                ),
            }
            sleep(delay).await;
        }
    }
}
