//! Rate-limited HTTP fetcher
//!
//! This module handles all outbound HTTP for the crawler, including:
//! - Pacing every request through the rate limiter
//! - Building HTTP clients for the active identity
//! - Classifying responses into fetch outcomes
//! - Rotating identity once on HTTP 403 before declaring a block

use crate::config::FetchConfig;
use crate::fetch::{Identity, IdentityPool, RateLimiter};
use crate::{Result, ScoutError};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Result of a single fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the page
    Success {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
        /// Final URL after redirects
        final_url: String,
    },

    /// Source answered 429; the caller decides whether to retry later
    Throttled,

    /// Source answered 403 twice across an identity rotation
    Blocked,

    /// Network failure or server error worth retrying
    TransientError {
        /// Error description
        message: String,
    },
}

/// Fetcher that paces, identifies, and classifies every request
///
/// All requests share one rate limiter and one identity pool. The fetcher
/// never retries transient errors itself; the crawl controller owns the
/// retry budget.
pub struct RateLimitedFetcher {
    config: FetchConfig,
    identities: IdentityPool,
    limiter: Mutex<RateLimiter>,
}

impl RateLimitedFetcher {
    /// Creates a fetcher from the fetch config and an identity pool
    pub fn new(config: FetchConfig, identities: IdentityPool) -> Self {
        let limiter = Mutex::new(RateLimiter::new(&config));
        Self {
            config,
            identities,
            limiter,
        }
    }

    /// Fetches a URL, waiting out rate limits first
    ///
    /// A 403 triggers one identity rotation and one paced retry; a second
    /// 403 is reported as `Blocked`. All other statuses classify on the
    /// first response.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        self.limiter.lock().await.acquire().await;

        let outcome = self.attempt(url, &self.identities.current()).await?;

        if !matches!(outcome, FetchOutcome::Blocked) {
            return Ok(outcome);
        }

        // First 403: rotate identity and retry once under pacing
        let identity = self.identities.rotate();
        warn!(url, "received 403, rotating identity and retrying");
        self.limiter.lock().await.acquire().await;
        self.attempt(url, &identity).await
    }

    async fn attempt(&self, url: &str, identity: &Identity) -> Result<FetchOutcome> {
        let client = self.build_client(identity)?;

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Ok(FetchOutcome::TransientError {
                    message: "request timeout".to_string(),
                })
            }
            Err(e) if e.is_connect() => {
                return Ok(FetchOutcome::TransientError {
                    message: "connection failed".to_string(),
                })
            }
            Err(e) => {
                return Err(ScoutError::Http {
                    url: url.to_string(),
                    source: e,
                })
            }
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if status == StatusCode::TOO_MANY_REQUESTS {
            debug!(url, "throttled by source");
            return Ok(FetchOutcome::Throttled);
        }

        if status == StatusCode::FORBIDDEN {
            return Ok(FetchOutcome::Blocked);
        }

        if status.is_server_error() {
            return Ok(FetchOutcome::TransientError {
                message: format!("server error {}", status.as_u16()),
            });
        }

        if !status.is_success() {
            return Ok(FetchOutcome::TransientError {
                message: format!("unexpected status {}", status.as_u16()),
            });
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Ok(FetchOutcome::TransientError {
                    message: format!("body read failed: {e}"),
                })
            }
        };

        Ok(FetchOutcome::Success {
            status: status.as_u16(),
            body,
            final_url,
        })
    }

    /// Builds an HTTP client presenting the given identity
    fn build_client(&self, identity: &Identity) -> Result<Client> {
        let mut builder = Client::builder()
            .user_agent(&identity.user_agent)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true);

        if let Some(proxy) = &identity.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentityConfig;

    fn create_test_fetcher() -> RateLimitedFetcher {
        let fetch = FetchConfig {
            delay_between_requests_ms: 0,
            ..Default::default()
        };
        let identity = IdentityConfig::default();
        RateLimitedFetcher::new(fetch, IdentityPool::new(&identity))
    }

    #[test]
    fn test_build_client_without_proxy() {
        let fetcher = create_test_fetcher();
        let identity = Identity {
            user_agent: "test-agent".to_string(),
            proxy: None,
        };
        assert!(fetcher.build_client(&identity).is_ok());
    }

    #[test]
    fn test_build_client_with_proxy() {
        let fetcher = create_test_fetcher();
        let identity = Identity {
            user_agent: "test-agent".to_string(),
            proxy: Some("http://127.0.0.1:9999".to_string()),
        };
        assert!(fetcher.build_client(&identity).is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_proxy() {
        let fetcher = create_test_fetcher();
        let identity = Identity {
            user_agent: "test-agent".to_string(),
            proxy: Some("not a url".to_string()),
        };
        assert!(fetcher.build_client(&identity).is_err());
    }

    // Response classification (429/403/5xx) is exercised against wiremock
    // in the integration tests.
}
