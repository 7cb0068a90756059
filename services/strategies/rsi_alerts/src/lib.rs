//! # RSI Alerts Strategy - Oversold Notification Service
//!
//! ## Purpose
//!
//! Recurring market monitor that polls recent candles for a fixed symbol set,
//! computes RSI over closing prices and sends a one-shot Telegram alert when a
//! symbol's RSI drops below the configured threshold. Repeat alerts are
//! suppressed until the reading recovers to the threshold or above. The
//! service observes and notifies only; it never places orders.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Bybit v5 public kline endpoint, one category at a time
//!   (linear, then spot by default)
//! - **Output Destinations**: Telegram bot `sendMessage`
//! - **Configuration**: defaults, optional TOML file, `RSI_ALERTS__*` and the
//!   plain `TELEGRAM_*` / `BYBIT_*` variables
//!
//! ## Architecture Role
//!
//! ```text
//! Kline Endpoint → [CandleFetcher] → [RsiCalculator] → [AlertStateStore] → [Notifier]
//!       ↓                ↓                  ↓                  ↓               ↓
//!  linear / spot    Category Fallback   Last RSI Value    Armed / Normal   Telegram Text
//!  JSON Candles     Oldest-First Closes "Undefined" Case  One Alert/Dip    Logged Failures
//! ```
//!
//! ## Tick Model
//!
//! - All symbol fetches of a tick are in flight together; the tick waits for
//!   every one of them to settle
//! - Decisions and notifications then run sequentially in configured order
//! - Ticks never overlap; the poll interval is slept after each tick
//!
//! ## Examples
//!
//! ### Running a Single Tick
//! ```rust,no_run
//! use rsi_alerts::{ReqwestTransport, RsiAlertConfig, RsiAlertStrategy};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RsiAlertConfig::load()?;
//! let transport = Arc::new(ReqwestTransport::new()?);
//! let mut strategy = RsiAlertStrategy::new(config, transport)?;
//!
//! let report = strategy.run_tick().await;
//! println!("{} alerts fired", report.alerts_fired());
//! # Ok(())
//! # }
//! ```
//!
//! ### Computing RSI Directly
//! ```rust
//! use rsi_alerts::RsiCalculator;
//!
//! let rsi = RsiCalculator::new(6);
//! assert_eq!(rsi.calculate(&[1.0, 2.0, 3.0]), None); // too short
//! assert_eq!(rsi.calculate(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]), Some(0.0));
//! assert_eq!(rsi.calculate(&[5.0; 10]), None); // flat: 0/0 is no signal
//! ```

pub mod alerts;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod logging;
pub mod notifier;
pub mod strategy;
pub mod testing;
pub mod transport;

pub use alerts::{AlertStateStore, AlertTransition, MonitorStats};
pub use config::RsiAlertConfig;
pub use error::{MonitorError, Result};
pub use fetcher::CandleFetcher;
pub use indicators::RsiCalculator;
pub use notifier::{Notifier, TelegramNotifier};
pub use strategy::{RsiAlertStrategy, TickReport};
pub use transport::{HttpTransport, ReqwestTransport};
