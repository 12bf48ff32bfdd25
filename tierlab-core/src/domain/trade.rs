//! TradeRecord: a completed (or still open) round trip.

use super::signal::{ExitReason, Tier};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A round trip from a buy bar to the matching sell bar, priced at closes.
///
/// Positions still open at the end of the series are reported with
/// `open = true` and marked to the last close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Tier at the moment the position closed (or at the last bar if still open).
    pub tier: Tier,
    /// Whether the position was promoted from tactical during its life.
    pub upgraded: bool,

    // ── Entry ──
    pub entry_bar: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_bar: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: Option<ExitReason>,
    /// No sell closed the position; the exit is the last bar's close.
    #[serde(default)]
    pub open: bool,

    pub bars_held: usize,
}

impl TradeRecord {
    /// Return on the trade as a fraction of entry price.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.exit_price / self.entry_price - 1.0
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_winner(&self) -> bool {
        self.return_pct() > 0.0
    }
}
