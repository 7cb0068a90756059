//! Strategy configuration
//!
//! Loaded once at startup from defaults, an optional TOML file and the
//! environment, then validated before the monitor loop is allowed to start.

use crate::error::{MonitorError, Result};
use monitor_config::service::{exchange, monitor, notifications};
use monitor_config::{resolve_config_path, ServiceConfigLoader};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "RSI_ALERTS_CONFIG_PATH";

/// Config file used when `RSI_ALERTS_CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "configs/rsi_alerts.toml";

/// Prefix for structured environment overrides (`RSI_ALERTS__RSI_PERIOD=14`)
pub const ENV_PREFIX: &str = "RSI_ALERTS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiAlertConfig {
    /// Symbols to monitor, processed in this order every tick
    pub symbols: Vec<String>,

    /// RSI lookback period
    pub rsi_period: usize,

    /// Alert fires when RSI drops strictly below this value
    pub rsi_threshold: f64,

    /// Exchange candle interval code
    pub interval: String,

    /// Candles requested per fetch
    pub candle_limit: usize,

    /// Seconds slept after each tick
    pub poll_interval_secs: u64,

    pub exchange: ExchangeConfig,

    pub telegram: TelegramConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Kline endpoint URL
    pub kline_url: String,

    /// Market categories tried in order
    pub categories: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Reserved for authenticated endpoints; the public kline path never signs
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    #[serde(skip_serializing)]
    pub api_secret: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL
    pub api_base: String,

    #[serde(skip_serializing)]
    pub bot_token: String,

    /// Destination chat identifier
    pub chat_id: String,
}

impl Default for RsiAlertConfig {
    fn default() -> Self {
        Self {
            symbols: monitor::DEFAULT_SYMBOLS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rsi_period: monitor::RSI_PERIOD,
            rsi_threshold: monitor::RSI_THRESHOLD,
            interval: monitor::INTERVAL.to_string(),
            candle_limit: monitor::CANDLE_LIMIT,
            poll_interval_secs: monitor::POLL_INTERVAL_SECS,
            exchange: ExchangeConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            kline_url: exchange::BYBIT_KLINE_URL.to_string(),
            categories: exchange::DEFAULT_CATEGORIES
                .iter()
                .map(|c| c.to_string())
                .collect(),
            request_timeout_secs: exchange::REQUEST_TIMEOUT_SECS,
            api_key: None,
            api_secret: None,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: notifications::TELEGRAM_API_BASE.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

// Credentials stay out of logs.
impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("kline_url", &self.kline_url)
            .field("categories", &self.categories)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramConfig {
    /// `sendMessage` URL with the bot token in the path
    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl RsiAlertConfig {
    /// Load from `RSI_ALERTS_CONFIG_PATH` (or the default path), the
    /// `RSI_ALERTS__*` environment and the plain credential variables
    pub fn load() -> anyhow::Result<Self> {
        let path = resolve_config_path(CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH);

        ServiceConfigLoader::new(ENV_PREFIX)
            .with_file(path)
            .with_list_key("symbols")
            .with_list_key("exchange.categories")
            .with_env_override("telegram.bot_token", "TELEGRAM_TOKEN")
            .with_env_override("telegram.chat_id", "TELEGRAM_CHAT_ID")
            .with_env_override("exchange.api_key", "BYBIT_API_KEY")
            .with_env_override("exchange.api_secret", "BYBIT_API_SECRET")
            .load()
    }

    /// Reject anything the monitor loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(MonitorError::configuration("symbol list is empty"));
        }
        let mut seen = HashSet::new();
        for symbol in &self.symbols {
            if symbol.trim().is_empty() {
                return Err(MonitorError::configuration("symbol list contains a blank entry"));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(MonitorError::configuration(format!(
                    "duplicate symbol {}",
                    symbol
                )));
            }
        }

        if self.rsi_period == 0 {
            return Err(MonitorError::configuration("rsi_period must be at least 1"));
        }
        if self.candle_limit < self.min_candles() {
            return Err(MonitorError::configuration(format!(
                "candle_limit {} cannot produce RSI({}), need at least {}",
                self.candle_limit,
                self.rsi_period,
                self.min_candles()
            )));
        }
        if !self.rsi_threshold.is_finite()
            || self.rsi_threshold <= 0.0
            || self.rsi_threshold > 100.0
        {
            return Err(MonitorError::configuration(format!(
                "rsi_threshold {} must be within (0, 100]",
                self.rsi_threshold
            )));
        }
        if self.interval.trim().is_empty() {
            return Err(MonitorError::configuration("interval is blank"));
        }
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::configuration("poll_interval_secs must be positive"));
        }

        if self.exchange.kline_url.trim().is_empty() {
            return Err(MonitorError::configuration("exchange.kline_url is blank"));
        }
        if self.exchange.categories.is_empty()
            || self.exchange.categories.iter().any(|c| c.trim().is_empty())
        {
            return Err(MonitorError::configuration(
                "exchange.categories must list at least one non-blank category",
            ));
        }
        if self.exchange.request_timeout_secs == 0 {
            return Err(MonitorError::configuration(
                "exchange.request_timeout_secs must be positive",
            ));
        }

        if self.telegram.bot_token.trim().is_empty() {
            return Err(MonitorError::configuration(
                "telegram bot token missing (set TELEGRAM_TOKEN)",
            ));
        }
        if self.telegram.chat_id.trim().is_empty() {
            return Err(MonitorError::configuration(
                "telegram chat id missing (set TELEGRAM_CHAT_ID)",
            ));
        }

        Ok(())
    }

    /// Closing prices needed for a defined RSI value
    pub fn min_candles(&self) -> usize {
        self.rsi_period + 1
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange.request_timeout_secs)
    }
}

/// Human-readable timeframe for an exchange interval code ("240" -> "4h")
pub fn timeframe_label(interval: &str) -> String {
    match interval {
        "D" => return "1d".to_string(),
        "W" => return "1w".to_string(),
        "M" => return "1M".to_string(),
        _ => {}
    }

    match interval.parse::<u64>() {
        Ok(minutes) if minutes > 0 && minutes % 1440 == 0 => format!("{}d", minutes / 1440),
        Ok(minutes) if minutes > 0 && minutes % 60 == 0 => format!("{}h", minutes / 60),
        Ok(minutes) if minutes > 0 => format!("{}m", minutes),
        _ => interval.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> RsiAlertConfig {
        let mut config = RsiAlertConfig::default();
        config.telegram.bot_token = "123:abc".to_string();
        config.telegram.chat_id = "-1001".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = RsiAlertConfig::default();
        assert_eq!(config.symbols.len(), 7);
        assert_eq!(config.symbols[0], "DOGEUSDT");
        assert_eq!(config.rsi_period, 6);
        assert_eq!(config.rsi_threshold, 35.0);
        assert_eq!(config.interval, "240");
        assert_eq!(config.candle_limit, 100);
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.exchange.categories, vec!["linear", "spot"]);
        assert_eq!(config.min_candles(), 7);
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_notification_credentials() {
        let mut config = valid_config();
        config.telegram.bot_token = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(MonitorError::Configuration { .. })
        ));

        let mut config = valid_config();
        config.telegram.chat_id.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_parameters() {
        let mut config = valid_config();
        config.symbols.clear();
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.symbols.push("DOGEUSDT".to_string());
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rsi_period = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.candle_limit = config.rsi_period;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rsi_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.rsi_threshold = 101.0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.exchange.categories = vec!["linear".to_string(), "".to_string()];
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exchange_credentials_are_optional() {
        let config = valid_config();
        assert!(config.exchange.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = valid_config();
        config.exchange.api_secret = Some("very-secret".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains("123:abc"));
    }

    #[test]
    fn test_send_message_url() {
        let mut telegram = TelegramConfig::default();
        telegram.api_base = "http://localhost:1234/".to_string();
        telegram.bot_token = "tok".to_string();
        assert_eq!(
            telegram.send_message_url(),
            "http://localhost:1234/bottok/sendMessage"
        );
    }

    #[test]
    fn test_timeframe_label() {
        assert_eq!(timeframe_label("240"), "4h");
        assert_eq!(timeframe_label("60"), "1h");
        assert_eq!(timeframe_label("15"), "15m");
        assert_eq!(timeframe_label("1440"), "1d");
        assert_eq!(timeframe_label("D"), "1d");
        assert_eq!(timeframe_label("W"), "1w");
        assert_eq!(timeframe_label("M"), "1M");
        assert_eq!(timeframe_label("odd"), "odd");
    }
}
