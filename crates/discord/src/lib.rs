use std::time::Duration;

use reqwest::{StatusCode, header};
use run_notify_core::WebhookPayload;
use serde::Deserialize;
use thiserror::Error;
use tokio::time::sleep;
use url::Url;

const MAX_ATTEMPTS: u32 = 4;
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Webhook returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("Failed to send webhook request")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for DeliveryError {
    // The webhook URL is a secret.
    fn from(e: reqwest::Error) -> Self { Self::Transport(e.without_url()) }
}

/// Rate limit response body.
#[derive(Deserialize)]
struct RateLimited {
    retry_after: f64,
}

#[derive(Clone)]
pub struct Discord {
    client: reqwest::Client,
    max_attempts: u32,
}

impl Discord {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("run-notify/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, max_attempts: MAX_ATTEMPTS })
    }

    /// Post `payload` to the webhook, retrying on rate limits and server errors.
    pub async fn execute_webhook(
        &self,
        webhook: &Url,
        payload: &WebhookPayload,
    ) -> Result<(), DeliveryError> {
        let url = with_query_param(webhook, "wait", "true");
        let mut attempt = 0;
        loop {
            attempt += 1;
            let (error, delay) = match self.client.post(url.clone()).json(payload).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!("Delivered webhook (attempt {}/{})", attempt, self.max_attempts);
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    let header_delay = response
                        .headers()
                        .get(header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<f64>().ok());
                    let body = response.text().await.unwrap_or_default();
                    let retry_after = serde_json::from_str::<RateLimited>(&body)
                        .ok()
                        .map(|r| r.retry_after)
                        .or(header_delay);
                    let delay = retry_delay(status, retry_after, attempt);
                    (DeliveryError::Status { status, body }, delay)
                }
                Err(e) => (DeliveryError::from(e), Some(backoff(attempt))),
            };
            match delay {
                Some(delay) if attempt < self.max_attempts => {
                    tracing::warn!(
                        "Webhook delivery failed, retrying in {}ms (attempt {}/{}): {}",
                        delay.as_millis(),
                        attempt,
                        self.max_attempts,
                        error
                    );
                    sleep(delay).await;
                }
                _ => return Err(error),
            }
        }
    }
}

fn backoff(attempt: u32) -> Duration { Duration::from_secs(1 << attempt.min(16)).min(MAX_BACKOFF) }

/// How long to wait before retrying a response with `status`, or `None` if
/// the request should not be retried.
fn retry_delay(status: StatusCode, retry_after: Option<f64>, attempt: u32) -> Option<Duration> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let delay = retry_after
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(|secs| Duration::from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())))
            .unwrap_or_else(|| backoff(attempt));
        Some(delay)
    } else if status.is_server_error() {
        Some(backoff(attempt))
    } else {
        None
    }
}

/// Set a query parameter, replacing any existing value for `key`.
fn with_query_param(url: &Url, key: &str, value: &str) -> Url {
    let mut out = url.clone();
    let pairs =
        url.query_pairs().filter(|(k, _)| k != key).map(|(k, v)| (k.into_owned(), v.into_owned()));
    let pairs = pairs.collect::<Vec<_>>();
    out.query_pairs_mut().clear().extend_pairs(pairs).append_pair(key, value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay() {
        let cases: &[(StatusCode, Option<f64>, u32, Option<Duration>)] = &[
            (StatusCode::TOO_MANY_REQUESTS, Some(1.5), 1, Some(Duration::from_millis(1500))),
            (StatusCode::TOO_MANY_REQUESTS, Some(600.0), 1, Some(MAX_RETRY_AFTER)),
            (StatusCode::TOO_MANY_REQUESTS, Some(1e30), 1, Some(MAX_RETRY_AFTER)),
            (StatusCode::TOO_MANY_REQUESTS, Some(f64::INFINITY), 1, Some(Duration::from_secs(2))),
            (StatusCode::TOO_MANY_REQUESTS, Some(-1.0), 2, Some(Duration::from_secs(4))),
            (StatusCode::TOO_MANY_REQUESTS, None, 1, Some(Duration::from_secs(2))),
            (StatusCode::INTERNAL_SERVER_ERROR, None, 1, Some(Duration::from_secs(2))),
            (StatusCode::BAD_GATEWAY, Some(5.0), 3, Some(Duration::from_secs(8))),
            (StatusCode::SERVICE_UNAVAILABLE, None, 10, Some(MAX_BACKOFF)),
            (StatusCode::BAD_REQUEST, None, 1, None),
            (StatusCode::NOT_FOUND, Some(1.0), 1, None),
            (StatusCode::UNAUTHORIZED, None, 1, None),
        ];
        for &(status, retry_after, attempt, expected) in cases {
            assert_eq!(
                retry_delay(status, retry_after, attempt),
                expected,
                "status {status} retry_after {retry_after:?} attempt {attempt}"
            );
        }
    }

    #[test]
    fn test_backoff() {
        let delays = (1..=6).map(backoff).map(|d| d.as_secs()).collect::<Vec<_>>();
        assert_eq!(delays, [2, 4, 8, 16, 30, 30]);
        assert_eq!(backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_with_query_param() {
        let cases = [
            (
                "https://discord.com/api/webhooks/1/abc",
                "https://discord.com/api/webhooks/1/abc?wait=true",
            ),
            (
                "https://discord.com/api/webhooks/1/abc?thread_id=9",
                "https://discord.com/api/webhooks/1/abc?thread_id=9&wait=true",
            ),
            (
                "https://discord.com/api/webhooks/1/abc?wait=false",
                "https://discord.com/api/webhooks/1/abc?wait=true",
            ),
        ];
        for (input, expected) in cases {
            let url = Url::parse(input).unwrap();
            assert_eq!(with_query_param(&url, "wait", "true").as_str(), expected);
        }
    }

    #[tokio::test]
    async fn test_transport_error_hides_url() {
        let err = reqwest::Client::new()
            .post("ftp://discord.test/api/webhooks/1/secret-token")
            .send()
            .await
            .unwrap_err();
        assert!(err.url().is_some());
        let DeliveryError::Transport(source) = DeliveryError::from(err) else {
            panic!("expected a transport error");
        };
        assert!(source.url().is_none());
        assert!(!source.to_string().contains("secret-token"));
    }

    #[test]
    fn test_rate_limited_body() {
        let body = r#"{"message": "You are being rate limited.", "retry_after": 0.25, "global": false}"#;
        let parsed = serde_json::from_str::<RateLimited>(body).unwrap();
        assert_eq!(parsed.retry_after, 0.25);
    }
}
