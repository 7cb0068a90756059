//! Technical indicators for alert generation

use std::collections::VecDeque;

/// Simple Moving Average over a fixed trailing window
#[derive(Debug, Clone)]
pub struct MovingAverage {
    period: usize,
    values: VecDeque<f64>,
}

impl MovingAverage {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            values: VecDeque::with_capacity(period),
        }
    }

    /// Add a new value and return current MA
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        // Remove old values if we exceed the period
        if self.values.len() > self.period {
            self.values.pop_front();
        }

        self.current()
    }

    /// Get current moving average without adding new value.
    ///
    /// The window is summed on read so a window of zeros averages to exactly
    /// zero no matter what has been evicted before.
    pub fn current(&self) -> Option<f64> {
        if self.is_ready() {
            let sum: f64 = self.values.iter().sum();
            Some(sum / self.period as f64)
        } else {
            None
        }
    }

    /// Check if indicator is ready (has enough data points)
    pub fn is_ready(&self) -> bool {
        self.period > 0 && self.values.len() == self.period
    }

    /// Get the number of data points
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the indicator has no data points
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Relative Strength Index using simple moving averages of gains and losses.
///
/// Only the most recent reading is produced. `None` means no signal: too few
/// closes, or a flat window where both averages are zero (0/0).
#[derive(Debug, Clone, Copy)]
pub struct RsiCalculator {
    period: usize,
}

impl RsiCalculator {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Closing prices needed for a defined reading
    pub fn required_closes(&self) -> usize {
        self.period + 1
    }

    /// RSI of the last `period` price changes in `closes` (oldest first)
    pub fn calculate(&self, closes: &[f64]) -> Option<f64> {
        if self.period == 0 || closes.len() < self.required_closes() {
            return None;
        }

        let window = &closes[closes.len() - self.required_closes()..];
        let mut gains = MovingAverage::new(self.period);
        let mut losses = MovingAverage::new(self.period);

        for pair in window.windows(2) {
            let delta = pair[1] - pair[0];
            gains.update(delta.max(0.0));
            losses.update((-delta).max(0.0));
        }

        rsi_from_averages(gains.current()?, losses.current()?)
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        // 0/0 carries no signal; gains with no losses saturate at 100
        return if avg_gain == 0.0 { None } else { Some(100.0) };
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - 100.0 / (1.0 + rs);
    rsi.is_finite().then_some(rsi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average() {
        let mut ma = MovingAverage::new(3);

        assert_eq!(ma.update(10.0), None); // Not enough data
        assert_eq!(ma.update(20.0), None); // Still not enough
        assert_eq!(ma.update(30.0), Some(20.0)); // (10+20+30)/3 = 20
        assert_eq!(ma.update(40.0), Some(30.0)); // (20+30+40)/3 = 30
        assert_eq!(ma.len(), 3);
    }

    #[test]
    fn test_moving_average_zero_window_is_exact() {
        let mut ma = MovingAverage::new(2);
        ma.update(0.1);
        ma.update(0.2);
        ma.update(0.0);
        assert_eq!(ma.update(0.0), Some(0.0));
    }

    #[test]
    fn test_short_series_is_undefined() {
        let rsi = RsiCalculator::new(6);
        assert_eq!(rsi.calculate(&[]), None);
        assert_eq!(rsi.calculate(&[1.0]), None);
        assert_eq!(rsi.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), None);
        assert!(rsi.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).is_some());
    }

    #[test]
    fn test_zero_period_is_undefined() {
        assert_eq!(RsiCalculator::new(0).calculate(&[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_rising_series_is_100() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64 * 0.37).collect();
        assert_eq!(RsiCalculator::new(6).calculate(&closes), Some(100.0));
    }

    #[test]
    fn test_falling_series_is_0() {
        let closes: Vec<f64> = (1..=20).rev().map(|i| i as f64 * 1.5).collect();
        assert_eq!(RsiCalculator::new(6).calculate(&closes), Some(0.0));
    }

    #[test]
    fn test_flat_series_is_undefined_not_100() {
        let closes = vec![42.0; 20];
        let reading = RsiCalculator::new(6).calculate(&closes);
        assert_eq!(reading, None);
        assert_ne!(reading, Some(100.0));
        assert_ne!(reading, Some(0.0));
    }

    #[test]
    fn test_known_value() {
        // diffs [+1.0, -0.5]: avg gain 0.5, avg loss 0.25, rs 2
        let reading = RsiCalculator::new(2).calculate(&[1.0, 2.0, 1.5]).unwrap();
        assert!((reading - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_only_trailing_window_counts() {
        // The early crash falls outside the last three changes
        let closes = [10.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(RsiCalculator::new(3).calculate(&closes), Some(100.0));
    }

    #[test]
    fn test_mixed_series_is_bounded() {
        let closes = [
            0.081, 0.083, 0.079, 0.080, 0.078, 0.082, 0.085, 0.084, 0.080, 0.077,
        ];
        let reading = RsiCalculator::new(6).calculate(&closes).unwrap();
        assert!(reading > 0.0 && reading < 100.0);
    }
}
