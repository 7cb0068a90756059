//! Main RSI alert strategy implementation
//!
//! Every tick runs in two phases:
//!
//! 1. **Fetch and compute**: candle fetches for all symbols are dispatched
//!    together and awaited as a group, then RSI is computed per symbol.
//! 2. **Decide and notify**: readings are walked in configured symbol order,
//!    the alert gate is applied and notifications are sent one at a time.
//!
//! Alert state is only touched in phase 2, so it needs no locking.

use crate::alerts::{AlertStateStore, AlertTransition, MonitorStats};
use crate::config::{timeframe_label, RsiAlertConfig};
use crate::error::Result;
use crate::fetcher::CandleFetcher;
use crate::indicators::RsiCalculator;
use crate::logging::LogEmoji;
use crate::notifier::{Notifier, TelegramNotifier};
use crate::transport::HttpTransport;
use crate::{log_metrics, log_success};
use chrono::Utc;
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One symbol's phase-1 result
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolReading {
    pub symbol: String,
    /// Closes obtained this tick (0 when every category failed)
    pub closes: usize,
    pub rsi: Option<f64>,
}

/// One symbol's phase-2 result
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub rsi: Option<f64>,
    pub transition: AlertTransition,
    /// Delivery result when a notification was attempted
    pub notified: Option<bool>,
}

/// Everything that happened in one tick, in configured symbol order
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub outcomes: Vec<SymbolOutcome>,
}

impl TickReport {
    pub fn alerts_fired(&self) -> usize {
        self.count(AlertTransition::Fire)
    }

    pub fn undefined(&self) -> usize {
        self.count(AlertTransition::NoSignal)
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }

    fn count(&self, transition: AlertTransition) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.transition == transition)
            .count()
    }
}

/// RSI oversold monitor: startup summary, then periodic ticks
pub struct RsiAlertStrategy {
    config: RsiAlertConfig,
    fetcher: CandleFetcher,
    rsi: RsiCalculator,
    notifier: Arc<dyn Notifier>,
    alert_state: AlertStateStore,
    stats: MonitorStats,
    timeframe: String,
}

impl RsiAlertStrategy {
    /// Validate `config` and wire the Telegram notifier onto `transport`
    pub fn new(config: RsiAlertConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        let notifier = Arc::new(TelegramNotifier::new(
            transport.clone(),
            &config.telegram,
            config.request_timeout(),
        ));
        Self::with_notifier(config, transport, notifier)
    }

    pub fn with_notifier(
        config: RsiAlertConfig,
        transport: Arc<dyn HttpTransport>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            fetcher: CandleFetcher::new(transport, &config),
            rsi: RsiCalculator::new(config.rsi_period),
            notifier,
            alert_state: AlertStateStore::new(config.symbols.iter().cloned()),
            stats: MonitorStats::default(),
            timeframe: timeframe_label(&config.interval),
            config,
        })
    }

    /// Startup summary followed by the poll loop until `shutdown` resolves
    pub async fn start<F: Future>(&mut self, shutdown: F) {
        info!(
            "Starting RSI alert strategy: {} symbols, RSI({}) < {}, {} candles, every {:?}",
            self.config.symbols.len(),
            self.config.rsi_period,
            self.config.rsi_threshold,
            self.timeframe,
            self.config.poll_interval()
        );

        self.startup_report().await;
        self.run_until(shutdown).await;
    }

    /// Tick, sleep, repeat. Shutdown is honoured between ticks only.
    pub async fn run_until<F: Future>(&mut self, shutdown: F) {
        tokio::pin!(shutdown);

        loop {
            self.run_tick().await;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested after {} ticks", self.stats.ticks);
                    break;
                }
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }
    }

    /// Send one aggregate message with every symbol's current RSI.
    ///
    /// No alert state changes. Returns the message text.
    pub async fn startup_report(&self) -> String {
        let readings = self.collect_readings().await;

        let mut message = format!("{} RSI Bot Started:\n", LogEmoji::ROBOT);
        for reading in &readings {
            let value = match reading.rsi {
                Some(v) => format!("{:.2}", v),
                None => "N/A".to_string(),
            };
            message.push_str(&format!(
                "{} {}: RSI={}\n",
                LogEmoji::BULLET,
                reading.symbol,
                value
            ));
        }
        message.push_str(&format!(
            "\n{} Monitoring {} RSI...",
            LogEmoji::HOURGLASS,
            self.timeframe.to_uppercase()
        ));

        if self.notifier.send(&message).await {
            log_success!("Startup report sent for {} symbols", readings.len());
        } else {
            warn!("Startup report could not be delivered");
        }

        message
    }

    /// One full poll cycle across all configured symbols
    pub async fn run_tick(&mut self) -> TickReport {
        let readings = self.collect_readings().await;
        let threshold = self.config.rsi_threshold;
        let mut report = TickReport::default();

        for reading in readings {
            let SymbolReading { symbol, rsi, .. } = reading;
            let transition = self.alert_state.evaluate(&symbol, rsi, threshold);
            self.stats.record_transition(transition);

            let mut notified = None;
            match rsi {
                None => info!(symbol = %symbol, "Insufficient data, no RSI this tick"),
                Some(value) => {
                    info!("{} - RSI: {:.2}", symbol, value);

                    match transition {
                        AlertTransition::Fire => {
                            warn!(
                                "{} {} RSI {:.2} below {}, sending alert",
                                LogEmoji::WARNING,
                                symbol,
                                value,
                                threshold
                            );
                            let delivered = self.notifier.send(&self.alert_message(&symbol, value)).await;
                            if !delivered {
                                self.stats.record_notification_failure();
                            }
                            notified = Some(delivered);
                        }
                        AlertTransition::Suppressed => {
                            debug!(symbol = %symbol, "Still below threshold, alert already sent");
                        }
                        AlertTransition::Reset => {
                            info!(symbol = %symbol, "RSI recovered to {:.2}, alert re-armed", value);
                        }
                        AlertTransition::Steady | AlertTransition::NoSignal => {}
                    }
                }
            }

            report.outcomes.push(SymbolOutcome {
                symbol,
                rsi,
                transition,
                notified,
            });
        }

        self.stats.record_tick(Utc::now());
        log_metrics!(
            "Tick {}: {} readings, {} undefined, {} alerts",
            self.stats.ticks,
            report.outcomes.len(),
            report.undefined(),
            report.alerts_fired()
        );

        report
    }

    /// Phase 1: fan out every fetch, then compute RSI per symbol
    pub async fn collect_readings(&self) -> Vec<SymbolReading> {
        let fetches = self.config.symbols.iter().map(|symbol| async move {
            let closes = self.fetcher.fetch_closes(symbol).await;
            SymbolReading {
                symbol: symbol.clone(),
                closes: closes.len(),
                rsi: self.rsi.calculate(&closes),
            }
        });

        join_all(fetches).await
    }

    pub fn alert_message(&self, symbol: &str, rsi: f64) -> String {
        format!(
            "{} RSI Alert!\nPair: {}\nRSI({}): {:.2}\nTimeframe: {}",
            LogEmoji::WARNING,
            symbol,
            self.config.rsi_period,
            rsi,
            self.timeframe
        )
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }

    pub fn alert_state(&self) -> &AlertStateStore {
        &self.alert_state
    }

    pub fn config(&self) -> &RsiAlertConfig {
        &self.config
    }
}
