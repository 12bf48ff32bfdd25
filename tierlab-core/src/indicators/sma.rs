//! Simple Moving Average (SMA) of close.
//!
//! Lookback: period - 1 (first valid value at index period-1).

use super::indicator::Indicator;
use super::rolling::rolling_mean;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: Self::key(period),
        }
    }

    /// Series key under which an SMA of `period` is stored.
    pub fn key(period: usize) -> String {
        format!("sma_{period}")
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period)
    }
}
