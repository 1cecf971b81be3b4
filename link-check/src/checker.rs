use std::time::Duration;

use futures::stream::{self, StreamExt};
use reqwest::{redirect, Client, Method, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::Config;

/// Statuses worth another attempt before giving up.
const RETRY_STATUSES: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub url: String,
    /// `None` when no response arrived at all.
    pub status: Option<u16>,
    /// Final URL after redirects, or the error message.
    pub detail: String,
}

impl CheckOutcome {
    pub fn is_failure(&self) -> bool {
        self.status.map_or(true, |status| status >= 400)
    }
}

pub struct Checker {
    client: Client,
    retries: u32,
    backoff: Duration,
}

impl Checker {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .redirect(redirect::Policy::limited(10))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Uses a preconfigured client; retry settings still come from `config`.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            retries: config.retries,
            backoff: config.backoff,
        }
    }

    /// HEAD first since it is cheap. Plenty of servers refuse HEAD, so any
    /// error status is double checked with GET.
    pub async fn check(&self, url: &str) -> CheckOutcome {
        let result = match self.send(Method::HEAD, url).await {
            Ok(response) if response.status().as_u16() >= 400 => {
                debug!("HEAD {} returned {}, retrying with GET", url, response.status());
                self.send(Method::GET, url).await
            }
            other => other,
        };

        match result {
            Ok(response) => CheckOutcome {
                url: url.to_string(),
                status: Some(response.status().as_u16()),
                detail: response.url().to_string(),
            },
            Err(e) => CheckOutcome {
                url: url.to_string(),
                status: None,
                detail: e.to_string(),
            },
        }
    }

    pub async fn check_all(&self, urls: &[String], concurrency: usize) -> Vec<CheckOutcome> {
        info!("Checking {} links, {} at a time", urls.len(), concurrency);
        stream::iter(urls)
            .map(|url| self.check(url))
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }

    async fn send(&self, method: Method, url: &str) -> reqwest::Result<Response> {
        let mut attempt = 0;
        loop {
            let result = self.client.request(method.clone(), url).send().await;
            let retryable = match &result {
                Ok(response) => RETRY_STATUSES.contains(&response.status()),
                Err(e) => e.is_connect() || e.is_timeout(),
            };
            if !retryable || attempt >= self.retries {
                return result;
            }

            let delay = retry_delay(self.backoff, attempt);
            attempt += 1;
            warn!(
                "{} {} failed, retry {}/{} in {:?}",
                method, url, attempt, self.retries, delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// `backoff` doubled once per earlier retry, capped instead of overflowing.
fn retry_delay(backoff: Duration, attempt: u32) -> Duration {
    backoff.saturating_mul(2u32.saturating_pow(attempt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: Option<u16>) -> CheckOutcome {
        CheckOutcome {
            url: "https://example.org/".to_string(),
            status,
            detail: String::new(),
        }
    }

    #[test]
    fn test_failure_classification() {
        assert!(!outcome(Some(200)).is_failure());
        assert!(!outcome(Some(301)).is_failure());
        assert!(outcome(Some(404)).is_failure());
        assert!(outcome(Some(503)).is_failure());
        assert!(outcome(None).is_failure());
    }

    #[test]
    fn test_retry_delay_doubles_and_saturates() {
        let backoff = Duration::from_millis(600);
        assert_eq!(retry_delay(backoff, 0), Duration::from_millis(600));
        assert_eq!(retry_delay(backoff, 2), Duration::from_millis(2400));

        let huge = Duration::from_millis(u64::MAX);
        assert_eq!(retry_delay(huge, 1), Duration::MAX);
        assert_eq!(retry_delay(Duration::from_secs(u64::MAX / 2), 2), Duration::MAX);
    }
}
