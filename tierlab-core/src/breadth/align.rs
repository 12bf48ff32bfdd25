//! Join breadth to the price timeline.
//!
//! Unlike tradable price data, breadth is a slow-moving reading, so a bar
//! without a same-day snapshot inherits the most recent earlier one. Bars
//! before the first snapshot get an indeterminate reading.

use super::history::BreadthHistory;
use crate::domain::{Bar, BreadthReading};

/// One forward-filled reading per bar, in bar order.
pub fn align_breadth(bars: &[Bar], history: &BreadthHistory) -> Vec<BreadthReading> {
    let readings: Vec<BreadthReading> = bars.iter().map(|b| history.reading_at(b.date)).collect();

    let filled = readings
        .iter()
        .zip(bars)
        .filter(|(r, b)| r.is_stale(b.date))
        .count();
    let missing = readings.iter().filter(|r| r.source_date.is_none()).count();
    if filled > 0 || missing > 0 {
        tracing::debug!(filled, missing, "breadth aligned with gaps");
    }

    readings
}
