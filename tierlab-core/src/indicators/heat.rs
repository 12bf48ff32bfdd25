//! Heat z-score: standardized deviation of volume (or amount) from its rolling mean.
//!
//! z[t] = (x[t] - mean(x[t-w+1..=t])) / std(x[t-w+1..=t]), sample std.
//! Lookback: window - 1. A zero or NaN deviation yields NaN.

use super::indicator::Indicator;
use super::rolling::rolling_mean_std;
use crate::config::HeatSource;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct HeatZScore {
    window: usize,
    source: HeatSource,
}

impl HeatZScore {
    pub const KEY: &'static str = "heat_z";

    pub fn new(window: usize, source: HeatSource) -> Self {
        assert!(window >= 2, "heat window must be >= 2");
        Self { window, source }
    }

    fn source_value(&self, bar: &Bar) -> f64 {
        match self.source {
            HeatSource::Volume => bar.volume,
            HeatSource::Amount => bar.amount.unwrap_or(f64::NAN),
        }
    }
}

impl Indicator for HeatZScore {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let xs: Vec<f64> = bars.iter().map(|b| self.source_value(b)).collect();
        let (means, stds) = rolling_mean_std(&xs, self.window);

        xs.iter()
            .zip(means.iter().zip(stds.iter()))
            .map(|(&x, (&mean, &std))| {
                if std.is_nan() || std <= 0.0 {
                    f64::NAN
                } else {
                    (x - mean) / std
                }
            })
            .collect()
    }
}
