//! Standardized emoji logging for the RSI alert service
//!
//! The same glyphs decorate log lines and the outbound Telegram text so
//! operators see identical markers in both places.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Standard emoji set for RSI alert logging and messages
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅"; // Operation succeeded
    pub const ERROR: &'static str = "❌"; // Operation failed
    pub const WARNING: &'static str = "⚠️"; // Warning or alert

    // Module-specific
    pub const CHART: &'static str = "📊"; // RSI readings
    pub const NETWORK: &'static str = "🌐"; // Exchange / Telegram traffic
    pub const ROBOT: &'static str = "🤖"; // Startup summary header
    pub const HOURGLASS: &'static str = "⏳"; // Monitoring in progress
    pub const BULLET: &'static str = "•"; // Summary list item
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info` for everything.
pub fn init_logging(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging for {}: {}", service_name, e))?;

    tracing::info!("{} Logging initialized for {}", LogEmoji::SUCCESS, service_name);
    Ok(())
}

// Convenience macros for standardized logging
#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}
