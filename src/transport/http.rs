use std::env;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::providers::AuthScheme;

/// Default outbound request timeout. One slow provider must not block the
/// caller indefinitely; deployments override via `TEXTLENS_HTTP_TIMEOUT_SECS`
/// or the client builder.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper around a shared `reqwest::Client` with the auth schemes the
/// provider registry declares. Single-shot request/response only; no
/// streaming, no retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        // Minimal production-friendly defaults (env-overridable).
        let timeout = timeout.unwrap_or_else(|| {
            Duration::from_secs(
                env::var("TEXTLENS_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            )
        });

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("TEXTLENS_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// POST a JSON body and return the raw response body on 2xx.
    ///
    /// Non-2xx statuses become [`TransportError::Status`] with a trimmed
    /// copy of the body so the caller can surface a useful message. JSON
    /// parsing of the body is left to the caller, which owns the
    /// shape-vs-transport error distinction.
    pub async fn post_json(
        &self,
        url: &str,
        auth: AuthScheme,
        api_key: &str,
        body: &serde_json::Value,
    ) -> Result<String, TransportError> {
        let url = Url::parse(url).map_err(|e| TransportError::Other(format!("invalid url '{url}': {e}")))?;

        let mut request = self.client.post(url.clone()).json(body);
        request = match auth {
            AuthScheme::BearerHeader => request.bearer_auth(api_key),
            AuthScheme::QueryKey(name) => request.query(&[(name, api_key)]),
        };

        let response = request.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        let text = response.text().await.map_err(TransportError::Http)?;

        debug!(url = %url, status = status.as_u16(), bytes = text.len(), "provider response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: truncate_body(&text),
            });
        }
        Ok(text)
    }
}

// Provider error bodies can be arbitrarily large; keep log lines bounded.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(600);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= 512 + 3);
    }
}
