use super::signal::Tier;
use serde::{Deserialize, Serialize};

/// Position state carried from one bar to the next.
///
/// There is at most one open position; it is always long.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PositionState {
    #[default]
    Flat,
    Long(OpenPosition),
}

impl PositionState {
    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long(_))
    }

    pub fn tier(&self) -> Option<Tier> {
        match self {
            PositionState::Flat => None,
            PositionState::Long(open) => Some(open.tier),
        }
    }

    pub fn open(&self) -> Option<&OpenPosition> {
        match self {
            PositionState::Flat => None,
            PositionState::Long(open) => Some(open),
        }
    }
}

/// Metadata of the open long position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub tier: Tier,
    pub entry_index: usize,
    /// High of the entry bar; the time stop compares later closes against it.
    pub entry_high: f64,
    /// Bars held after the entry bar.
    pub holding_days: u32,
    /// Highest close from the entry bar through the last held bar.
    pub max_close_since_entry: f64,
    /// Set once the position has been promoted from tactical to strategic.
    pub upgraded: bool,
}

impl OpenPosition {
    pub fn new(tier: Tier, entry_index: usize, entry_high: f64, entry_close: f64) -> Self {
        Self {
            tier,
            entry_index,
            entry_high,
            holding_days: 0,
            max_close_since_entry: entry_close,
            upgraded: false,
        }
    }

    /// Advance one held bar.
    pub fn hold(&mut self, close: f64) {
        self.holding_days += 1;
        // f64::max ignores a NaN operand, so a void close never erases the running max.
        self.max_close_since_entry = self.max_close_since_entry.max(close);
    }

    /// Promote a tactical position. Returns false if it was already strategic.
    pub fn upgrade(&mut self) -> bool {
        match self.tier {
            Tier::Tactical => {
                self.tier = Tier::Strategic;
                self.upgraded = true;
                true
            }
            Tier::Strategic => false,
        }
    }
}
