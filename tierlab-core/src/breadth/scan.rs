//! Universe breadth scan.
//!
//! Computes one day's `BreadthSnapshot` from the bar histories of every
//! constituent. Fetching those histories is the caller's job; this is the
//! pure aggregation step.

use crate::domain::{Bar, BreadthSnapshot};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bars a constituent needs before it counts toward breadth.
pub const MIN_SCAN_BARS: usize = 20;
/// Trailing window for the new-high test.
pub const NEW_HIGH_WINDOW: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub snapshot: BreadthSnapshot,
    pub eligible: usize,
    pub skipped: usize,
}

/// Per-constituent verdict. `None` when the history is too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockVerdict {
    pub above_ma20: bool,
    pub new_high: bool,
}

/// Evaluate one constituent's history (oldest first).
pub fn evaluate_stock(bars: &[Bar]) -> Option<StockVerdict> {
    if bars.len() < MIN_SCAN_BARS {
        return None;
    }
    let last = bars.last()?;

    let ma_window = &bars[bars.len() - MIN_SCAN_BARS..];
    let ma20 = ma_window.iter().map(|b| b.close).sum::<f64>() / MIN_SCAN_BARS as f64;

    // Newly listed names use whatever history they have.
    let high_window = &bars[bars.len() - bars.len().min(NEW_HIGH_WINDOW)..];
    let high = high_window
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);

    Some(StockVerdict {
        above_ma20: last.close > ma20,
        new_high: last.close >= high,
    })
}

/// Aggregate a universe into a snapshot dated `date`.
///
/// Returns `None` when no constituent has enough history.
pub fn scan_universe(date: NaiveDate, universe: &[Vec<Bar>]) -> Option<ScanOutcome> {
    let verdicts: Vec<StockVerdict> = universe
        .par_iter()
        .filter_map(|bars| evaluate_stock(bars))
        .collect();

    let eligible = verdicts.len();
    let skipped = universe.len() - eligible;
    if eligible == 0 {
        tracing::warn!(universe = universe.len(), "breadth scan found no eligible constituents");
        return None;
    }

    let pct = |count: usize| round2(count as f64 / eligible as f64 * 100.0);
    let above = verdicts.iter().filter(|v| v.above_ma20).count();
    let highs = verdicts.iter().filter(|v| v.new_high).count();

    let snapshot = BreadthSnapshot {
        date,
        pct_above_ma20: pct(above),
        pct_new_high: pct(highs),
    };
    tracing::info!(
        %date,
        eligible,
        skipped,
        pct_above_ma20 = snapshot.pct_above_ma20,
        pct_new_high = snapshot.pct_new_high,
        "breadth scan complete"
    );

    Some(ScanOutcome {
        snapshot,
        eligible,
        skipped,
    })
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
