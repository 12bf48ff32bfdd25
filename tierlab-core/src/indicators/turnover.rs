//! Turnover normalization to a 0–100 percent scale.
//!
//! Upstream sources disagree on units: some report turnover as a fraction
//! (0.012), others already in percent (1.2). Values above 1 are taken as
//! percent; everything else is scaled by 100. Applied once, here.

use super::indicator::Indicator;
use crate::domain::Bar;

/// Normalize a single raw turnover reading. NaN stays NaN.
pub fn normalize_turnover(raw: f64) -> f64 {
    if raw > 1.0 {
        raw
    } else {
        raw * 100.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct TurnoverPct;

impl TurnoverPct {
    pub const KEY: &'static str = "turnover_pct";

    pub fn new() -> Self {
        Self
    }
}

impl Indicator for TurnoverPct {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| normalize_turnover(b.turnover_raw)).collect()
    }
}
