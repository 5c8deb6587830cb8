//! Shared JSON-over-HTTP GET with bounded retry

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use realty_config::RetryConfig;

use crate::IntegrationError;

/// Retry budget for collaborator calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Initial backoff, doubled per attempt
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.backoff_ms),
        }
    }
}

/// HTTP client shared by every collaborator
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(retry: RetryPolicy) -> Result<Self, IntegrationError> {
        let client = Client::builder()
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// GET `url` with query parameters and decode the JSON body
    ///
    /// `collaborator` names the service in logs. Secrets in `query` are never
    /// logged.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        collaborator: &str,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, IntegrationError> {
        let mut last_error = None;
        let mut backoff = self.retry.initial_backoff;

        for attempt in 0..=self.retry.max_retries {
            if attempt > 0 {
                tracing::debug!(collaborator, ?backoff, attempt, "Retrying request");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute(url, query, timeout).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => {
                    tracing::warn!(collaborator, error = %e, attempt, "Transient collaborator failure");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| IntegrationError::Network("Retries exhausted".to_string())))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, IntegrationError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| IntegrationError::InvalidResponse(e.to_string()))
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> IntegrationError {
    if err.is_timeout() {
        IntegrationError::Timeout(timeout.as_secs())
    } else {
        // strip the URL, it carries the api key
        IntegrationError::Network(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            max_retries: 2,
            backoff_ms: 10,
        });
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.initial_backoff, Duration::from_millis(10));
        assert_eq!(RetryPolicy::default().max_retries, 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let fetcher = HttpFetcher::new(RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1),
        })
        .unwrap();

        // port 9 (discard) is closed on loopback
        let result: Result<serde_json::Value, _> = fetcher
            .get_json("test", "http://127.0.0.1:9/", &[], Duration::from_secs(2))
            .await;
        let err = result.unwrap_err();
        assert!(err.is_retryable(), "unexpected error: {err:?}");
    }
}
