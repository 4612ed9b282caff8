use std::time::Duration;

use calsync_domain::constants::{DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS};
use calsync_domain::HttpConfig;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

use crate::errors::TransportError;

/// HTTP client with timeout and optional retry support.
///
/// Retries are off unless `max_attempts > 1`. When enabled, 5xx responses and
/// connect/timeout failures are retried with exponential backoff.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Build a client from the `[http]` configuration section.
    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let mut builder =
            Self::builder().timeout(config.timeout()).max_attempts(config.max_attempts);
        if let Some(agent) = config.user_agent.as_deref().filter(|a| !a.trim().is_empty()) {
            builder = builder.user_agent(agent);
        }
        builder.build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Non-2xx responses are returned as-is so callers can read error bodies.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, TransportError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                TransportError(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build()?;

            let method = request.method().clone();
            // Query strings are not logged; nextLink tokens are opaque and long.
            let path = request.url().path().to_string();
            debug!(attempt = attempt + 1, %method, %path, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %path, %status, "received HTTP response");

                    if status.is_server_error() && attempt + 1 < attempts {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %path, error = %err, "HTTP request failed");

                    if attempt + 1 < attempts && should_retry_error(&err) {
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    return Err(err.into());
                }
            }
        }

        Err(TransportError("http client exhausted retries without producing a result".into()))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, TransportError> {
        let agent = self
            .user_agent
            .unwrap_or_else(|| concat!("calsync/", env!("CARGO_PKG_VERSION")).to_string());

        // Proxies come from HTTP_PROXY / HTTPS_PROXY / NO_PROXY.
        let client = ReqwestClient::builder().timeout(self.timeout).user_agent(agent).build()?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Body of a non-2xx response, for diagnostics. A body that cannot be read is
/// logged and treated as empty.
pub(crate) async fn error_body(response: Response) -> String {
    let status = response.status().as_u16();
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            let error = TransportError::from(e);
            debug!(status, %error, "failed to read error response body");
            String::new()
        }
    }
}
