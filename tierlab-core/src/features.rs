//! Feature pass: the parallel first phase of the pipeline.
//!
//! All indicators are independent of one another, so they are computed
//! concurrently on the rayon pool and assembled into one `DerivedFeatures`
//! row per bar. Nothing here depends on position state.

use crate::config::SignalConfig;
use crate::domain::Bar;
use crate::indicators::{GainStreak, HeatZScore, Indicator, IndicatorValues, Sma, TurnoverPct};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Moving-average windows computed on close.
pub const MA_WINDOWS: [usize; 5] = [5, 10, 20, 30, 60];

/// Indicator values for one bar. NaN marks an indeterminate value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub date: NaiveDate,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma30: f64,
    pub ma60: f64,
    pub streak: u32,
    pub heat_z: f64,
    pub turnover_pct: f64,
}

/// Output of the feature pass.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub rows: Vec<DerivedFeatures>,
    pub values: IndicatorValues,
    /// Longest lookback across all indicators.
    pub warmup_bars: usize,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when the series is too short for every rolling window to fill.
    pub fn insufficient_history(&self) -> bool {
        self.rows.len() <= self.warmup_bars
    }
}

/// Indicator set implied by a configuration.
pub fn indicator_set(config: &SignalConfig) -> Vec<Box<dyn Indicator>> {
    let mut indicators: Vec<Box<dyn Indicator>> = MA_WINDOWS
        .iter()
        .map(|&p| Box::new(Sma::new(p)) as Box<dyn Indicator>)
        .collect();
    indicators.push(Box::new(GainStreak::new()));
    indicators.push(Box::new(HeatZScore::new(
        config.heat.window,
        config.heat.source,
    )));
    indicators.push(Box::new(TurnoverPct::new()));
    indicators
}

/// Compute the warmup length from a set of indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}

/// Precompute every indicator in parallel, then assemble per-bar rows.
pub fn compute_features(bars: &[Bar], config: &SignalConfig) -> FeatureSet {
    let indicators = indicator_set(config);
    let warmup_bars = compute_warmup(&indicators);

    let computed: Vec<(String, Vec<f64>)> = indicators
        .par_iter()
        .map(|indicator| {
            let series = indicator.compute(bars);
            debug_assert_eq!(
                series.len(),
                bars.len(),
                "indicator '{}' produced {} values for {} bars",
                indicator.name(),
                series.len(),
                bars.len()
            );
            (indicator.name().to_string(), series)
        })
        .collect();

    let mut values = IndicatorValues::new();
    for (name, series) in computed {
        values.insert(name, series);
    }

    let rows = assemble_rows(bars, &values);
    tracing::debug!(
        bars = bars.len(),
        indicators = values.len(),
        warmup_bars,
        "feature pass complete"
    );

    FeatureSet {
        rows,
        values,
        warmup_bars,
    }
}

fn assemble_rows(bars: &[Bar], values: &IndicatorValues) -> Vec<DerivedFeatures> {
    let ma = |period: usize, i: usize| values.value(&Sma::key(period), i);
    bars.iter()
        .enumerate()
        .map(|(i, bar)| DerivedFeatures {
            date: bar.date,
            ma5: ma(5, i),
            ma10: ma(10, i),
            ma20: ma(20, i),
            ma30: ma(30, i),
            ma60: ma(60, i),
            streak: values.get(GainStreak::KEY, i).unwrap_or(0.0) as u32,
            heat_z: values.value(HeatZScore::KEY, i),
            turnover_pct: values.value(TurnoverPct::KEY, i),
        })
        .collect()
}
