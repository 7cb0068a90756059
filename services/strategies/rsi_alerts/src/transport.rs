//! HTTP transport seam shared by the candle fetcher and the notifier

use crate::error::{MonitorError, Result};
use crate::logging::LogEmoji;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Minimal HTTP client abstraction.
///
/// Implementations must tolerate concurrent calls from one tick's fan-out.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with query parameters and decode the body as JSON
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value>;

    /// POST a form-encoded body; any 2xx counts as delivered
    async fn post_form(&self, url: &str, form: &[(&str, &str)], timeout: Duration) -> Result<()>;
}

/// Production transport backed by one pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the shared client; the pool is reused across ticks
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(300))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(300))
            .tcp_nodelay(true)
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_request_error(error: reqwest::Error, timeout: Duration) -> MonitorError {
    if error.is_timeout() {
        MonitorError::Timeout(timeout)
    } else {
        MonitorError::Http(error)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_request_error(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| map_request_error(e, timeout))?;
        debug!("{} GET {} returned {} bytes", LogEmoji::NETWORK, url, body.len());

        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_form(&self, url: &str, form: &[(&str, &str)], timeout: Duration) -> Result<()> {
        let response = self
            .client
            .post(url)
            .form(form)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_request_error(e.without_url(), timeout))?;

        let status = response.status();
        if !status.is_success() {
            // The URL carries the bot token; report only the status
            return Err(MonitorError::HttpStatus {
                status: status.as_u16(),
                url: "<notification endpoint>".to_string(),
            });
        }

        Ok(())
    }
}
