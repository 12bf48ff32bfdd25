//! Shared builders for integration tests.
//!
//! `Day` describes one bar together with its features and breadth, so rule
//! scenarios can be written without running the feature pass.

#![allow(dead_code)]

use chrono::NaiveDate;
use tierlab_core::breadth::BreadthHistory;
use tierlab_core::domain::{Bar, BreadthReading, BreadthSnapshot, SignalRecord};
use tierlab_core::engine::fold_signals;
use tierlab_core::features::DerivedFeatures;
use tierlab_core::SignalConfig;

pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

#[derive(Debug, Clone, Copy)]
pub struct Day {
    pub close: f64,
    pub high: f64,
    pub ma5: f64,
    pub ma10: f64,
    pub ma20: f64,
    pub ma30: f64,
    pub ma60: f64,
    pub streak: u32,
    pub turnover: f64,
    pub heat_z: f64,
    pub breadth: f64,
    pub new_high: f64,
}

impl Default for Day {
    /// A quiet bar: above every average, no streak, no breadth extreme.
    fn default() -> Self {
        Self {
            close: 101.0,
            high: 102.0,
            ma5: 100.0,
            ma10: 100.0,
            ma20: f64::NAN,
            ma30: 100.0,
            ma60: f64::NAN,
            streak: 0,
            turnover: 1.2,
            heat_z: 2.0,
            breadth: 50.0,
            new_high: 5.0,
        }
    }
}

pub struct Frame {
    pub bars: Vec<Bar>,
    pub features: Vec<DerivedFeatures>,
    pub breadth: Vec<BreadthReading>,
}

pub fn build(days: &[Day]) -> Frame {
    let mut frame = Frame {
        bars: Vec::with_capacity(days.len()),
        features: Vec::with_capacity(days.len()),
        breadth: Vec::with_capacity(days.len()),
    };
    for (i, d) in days.iter().enumerate() {
        let date = base_date() + chrono::Duration::days(i as i64);
        frame.bars.push(Bar {
            date,
            open: d.close,
            high: d.high,
            low: d.close - 1.0,
            close: d.close,
            volume: 1000.0,
            amount: None,
            turnover_raw: d.turnover,
        });
        frame.features.push(DerivedFeatures {
            date,
            ma5: d.ma5,
            ma10: d.ma10,
            ma20: d.ma20,
            ma30: d.ma30,
            ma60: d.ma60,
            streak: d.streak,
            heat_z: d.heat_z,
            turnover_pct: d.turnover,
        });
        frame.breadth.push(BreadthReading {
            pct_above_ma20: d.breadth,
            pct_new_high: d.new_high,
            source_date: Some(date),
        });
    }
    frame
}

/// Fold the state machine over hand-built days with the given config.
pub fn fold_with(days: &[Day], config: &SignalConfig) -> Vec<SignalRecord> {
    let frame = build(days);
    fold_signals(&frame.bars, &frame.features, &frame.breadth, config, 0)
        .expect("hand-built frame is well formed")
        .records
}

pub fn fold(days: &[Day]) -> Vec<SignalRecord> {
    fold_with(days, &SignalConfig::default())
}

/// Random-walk index bars with varying volume and turnover.
pub fn make_test_bars(n: usize) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let change = ((seed >> 33) % 200) as f64 / 100.0 - 1.0;
        price = (price + change).max(10.0);

        let open = price - 0.2;
        let close = price + 0.1;
        bars.push(Bar {
            date: base_date() + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 1000.0 + ((seed >> 20) % 500) as f64,
            amount: Some(close * 1000.0),
            turnover_raw: 0.005 + ((seed >> 40) % 20) as f64 / 1000.0,
        });
    }

    bars
}

/// Breadth that dips under 16 and spikes over 79 periodically.
pub fn cyclic_breadth(bars: &[Bar]) -> BreadthHistory {
    bars.iter()
        .enumerate()
        .map(|(i, b)| {
            let phase = (i as f64 * 0.09).sin();
            BreadthSnapshot {
                date: b.date,
                pct_above_ma20: 50.0 + 40.0 * phase,
                pct_new_high: 5.0 + 4.0 * phase,
            }
        })
        .collect()
}
