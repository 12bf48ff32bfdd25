//! Synthetic index and breadth series for offline demos and tests.
//!
//! Clearly fake: a seeded random walk for the index and a bounded walk for
//! breadth that leans with the index's daily return.

use crate::breadth::BreadthHistory;
use crate::domain::{Bar, BreadthSnapshot};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy)]
pub struct SyntheticSpec {
    pub seed: u64,
    pub start: NaiveDate,
    /// Trading days to generate; weekends are skipped.
    pub bars: usize,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or_default(),
            bars: 500,
        }
    }
}

pub fn generate_synthetic_index(spec: &SyntheticSpec) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut bars = Vec::with_capacity(spec.bars);
    let mut price = 5000.0_f64;
    let mut current = spec.start;

    while bars.len() < spec.bars {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.025..0.025);
        let open = price * (1.0 + rng.gen_range(-0.003..0.003));
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(8.0e8..2.0e9_f64).round();

        bars.push(Bar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
            amount: Some(volume * close),
            turnover_raw: rng.gen_range(0.006..0.03),
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}

/// One snapshot per bar, dated like the bars.
pub fn generate_synthetic_breadth(bars: &[Bar], seed: u64) -> BreadthHistory {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut above = 50.0_f64;
    let mut prev_close: Option<f64> = None;

    bars.iter()
        .map(|bar| {
            let ret = prev_close.map_or(0.0, |p| bar.close / p - 1.0);
            prev_close = Some(bar.close);

            // Pull toward 50 so the walk keeps revisiting both extremes.
            above += 600.0 * ret + 0.05 * (50.0 - above) + rng.gen_range(-4.0..4.0);
            above = above.clamp(2.0, 98.0);
            let new_high = (above * 0.3 + rng.gen_range(-5.0..5.0)).clamp(0.0, 100.0);

            BreadthSnapshot {
                date: bar.date,
                pct_above_ma20: round2(above),
                pct_new_high: round2(new_high),
            }
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
