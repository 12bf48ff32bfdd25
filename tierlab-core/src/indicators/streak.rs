//! Consecutive-gain streak.
//!
//! Run length of closes strictly above the previous close. Resets to 0 on any
//! flat or down day, on the first bar, and whenever either close is NaN.
//! Defined from bar 0, so there is no lookback.

use super::indicator::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct GainStreak;

impl GainStreak {
    pub const KEY: &'static str = "gain_streak";

    pub fn new() -> Self {
        Self
    }
}

impl Indicator for GainStreak {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut out = Vec::with_capacity(bars.len());
        let mut run = 0u32;
        for (i, bar) in bars.iter().enumerate() {
            run = match i.checked_sub(1).map(|p| bars[p].close) {
                Some(prev) if bar.close > prev => run + 1,
                _ => 0,
            };
            out.push(f64::from(run));
        }
        out
    }
}
