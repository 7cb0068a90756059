//! Outbound notifications
//!
//! Delivery is best effort: one attempt, failures are logged and reported as
//! `false`, never raised to the caller.

use crate::config::TelegramConfig;
use crate::error::MonitorError;
use crate::log_error;
use crate::transport::HttpTransport;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt delivery once; `true` when the channel accepted the message
    async fn send(&self, text: &str) -> bool;
}

/// Telegram bot `sendMessage` notifier
pub struct TelegramNotifier {
    transport: Arc<dyn HttpTransport>,
    url: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &TelegramConfig, timeout: Duration) -> Self {
        Self {
            transport,
            url: config.send_message_url(),
            chat_id: config.chat_id.clone(),
            timeout,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> bool {
        let form = [("chat_id", self.chat_id.as_str()), ("text", text)];

        let result = tokio::time::timeout(
            self.timeout,
            self.transport.post_form(&self.url, &form, self.timeout),
        )
        .await
        .unwrap_or_else(|_| Err(MonitorError::Timeout(self.timeout)));

        match result {
            Ok(()) => {
                debug!("Telegram message delivered ({} chars)", text.chars().count());
                true
            }
            Err(e) => {
                log_error!("Telegram error: {}", e);
                false
            }
        }
    }
}
