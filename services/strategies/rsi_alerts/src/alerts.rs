//! Per-symbol alert state and the hysteresis gate
//!
//! A symbol is either `Normal` (armed = false) or `Alerted` (armed = true).
//! One notification fires per below-threshold excursion; the gate re-arms
//! only after a reading at or above the threshold.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::warn;

/// Outcome of evaluating one reading against the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Reading undefined; state untouched
    NoSignal,
    /// Normal -> Alerted; a notification must be sent
    Fire,
    /// Still below threshold while Alerted
    Suppressed,
    /// Alerted -> Normal on recovery
    Reset,
    /// At or above threshold while already Normal
    Steady,
}

/// Pure transition rule: current armed flag and reading -> transition
pub fn decide(armed: bool, reading: Option<f64>, threshold: f64) -> AlertTransition {
    match reading {
        None => AlertTransition::NoSignal,
        Some(value) if value < threshold => {
            if armed {
                AlertTransition::Suppressed
            } else {
                AlertTransition::Fire
            }
        }
        Some(_) => {
            if armed {
                AlertTransition::Reset
            } else {
                AlertTransition::Steady
            }
        }
    }
}

/// Armed flags for exactly the configured symbol set.
///
/// Owned by the monitor loop and only touched after a tick's fan-in, so no
/// synchronization is needed.
#[derive(Debug, Clone)]
pub struct AlertStateStore {
    armed: HashMap<String, bool>,
}

impl AlertStateStore {
    /// Every symbol starts Normal
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            armed: symbols.into_iter().map(|s| (s.into(), false)).collect(),
        }
    }

    pub fn is_armed(&self, symbol: &str) -> bool {
        self.armed.get(symbol).copied().unwrap_or(false)
    }

    /// Update an existing symbol's flag; unknown symbols are rejected
    pub fn set_armed(&mut self, symbol: &str, armed: bool) -> bool {
        match self.armed.get_mut(symbol) {
            Some(flag) => {
                *flag = armed;
                true
            }
            None => {
                warn!(symbol = %symbol, "Ignoring alert state update for unconfigured symbol");
                false
            }
        }
    }

    /// Apply the gate to `symbol` and store the resulting state.
    ///
    /// Unconfigured symbols never alert.
    pub fn evaluate(&mut self, symbol: &str, reading: Option<f64>, threshold: f64) -> AlertTransition {
        if !self.contains(symbol) {
            warn!(symbol = %symbol, "Reading for unconfigured symbol ignored");
            return AlertTransition::NoSignal;
        }

        let transition = decide(self.is_armed(symbol), reading, threshold);
        match transition {
            AlertTransition::Fire => {
                self.set_armed(symbol, true);
            }
            AlertTransition::Reset => {
                self.set_armed(symbol, false);
            }
            AlertTransition::NoSignal | AlertTransition::Suppressed | AlertTransition::Steady => {}
        }
        transition
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.armed.contains_key(symbol)
    }
}

/// Monitor statistics accumulated across ticks
#[derive(Debug, Default, Clone)]
pub struct MonitorStats {
    pub ticks: u64,
    pub readings_defined: u64,
    pub readings_undefined: u64,
    pub alerts_fired: u64,
    pub alerts_suppressed: u64,
    pub resets: u64,
    pub notification_failures: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
}

impl MonitorStats {
    /// Update stats with one symbol's transition
    pub fn record_transition(&mut self, transition: AlertTransition) {
        match transition {
            AlertTransition::NoSignal => self.readings_undefined += 1,
            AlertTransition::Fire => {
                self.readings_defined += 1;
                self.alerts_fired += 1;
            }
            AlertTransition::Suppressed => {
                self.readings_defined += 1;
                self.alerts_suppressed += 1;
            }
            AlertTransition::Reset => {
                self.readings_defined += 1;
                self.resets += 1;
            }
            AlertTransition::Steady => self.readings_defined += 1,
        }
    }

    pub fn record_notification_failure(&mut self) {
        self.notification_failures += 1;
    }

    pub fn record_tick(&mut self, at: DateTime<Utc>) {
        self.ticks += 1;
        self.last_tick_at = Some(at);
    }
}
