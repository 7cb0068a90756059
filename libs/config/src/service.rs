//! Service defaults
//!
//! Default values and endpoints shared by the monitor services.

/// Exchange market-data defaults
pub mod exchange {
    /// Public Bybit v5 kline endpoint (no authentication required)
    pub const BYBIT_KLINE_URL: &str = "https://api.bybit.com/v5/market/kline";

    /// Market categories tried in order when fetching candles
    pub const DEFAULT_CATEGORIES: [&str; 2] = ["linear", "spot"];

    /// Per-request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// Notification channel defaults
pub mod notifications {
    /// Telegram bot API base URL; the token is appended as `/bot{token}`
    pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
}

/// RSI monitor defaults
pub mod monitor {
    /// Symbols watched when none are configured
    pub const DEFAULT_SYMBOLS: [&str; 7] = [
        "DOGEUSDT",
        "PEPEUSDT",
        "BONKUSDT",
        "WIFUSDT",
        "SHIBUSDT",
        "FLOKIUSDT",
        "ELONUSDT",
    ];

    /// RSI lookback period
    pub const RSI_PERIOD: usize = 6;

    /// Alert fires when RSI drops below this value
    pub const RSI_THRESHOLD: f64 = 35.0;

    /// Candle interval code ("240" = 4 hours)
    pub const INTERVAL: &str = "240";

    /// Candles requested per fetch
    pub const CANDLE_LIMIT: usize = 100;

    /// Seconds slept between ticks
    pub const POLL_INTERVAL_SECS: u64 = 15;
}
