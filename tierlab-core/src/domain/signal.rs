//! Per-bar signal records emitted by the state machine.

use crate::regime::Regime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete per-bar classification. Serialized as `-1 / 0 / 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.as_i8()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Sell),
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Buy),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}

/// Entry tier of an open position.
///
/// Strategic positions leave only on macro overheat. Tactical positions also
/// leave on a trend break or time stop, and can be promoted to strategic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Strategic,
    Tactical,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Strategic => "strategic",
            Tier::Tactical => "tactical",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Breadth overheated while heat faded.
    MacroOverheat,
    /// Tactical only: close under MA30 on a down day.
    TrendBreak,
    /// Tactical only: close under MA30 after the holding window without a new high.
    TimeStop,
}

/// Inputs whose indeterminate value forced a rule condition to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Close,
    PriorClose,
    PriorStreak,
    Ma5,
    Ma10,
    Ma30,
    HeatZ,
    Turnover,
    Breadth,
    NewHigh,
    Regime,
}

/// One output row of the signal pass, aligned with the input bar of the same index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub date: NaiveDate,
    pub signal: Signal,
    /// Tier of the position on this bar: the new tier on a buy bar, the
    /// closing tier on a sell bar, `None` while flat.
    pub tier: Option<Tier>,
    /// Set only on the bar where a tactical position was promoted.
    pub upgraded: bool,
    pub regime: Regime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<ExitReason>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indeterminate: Vec<FeatureKind>,
}

impl SignalRecord {
    /// Tier label as shown to collaborators: `strategic`, `tactical` or `none`.
    pub fn tier_label(&self) -> &'static str {
        self.tier.map_or("none", Tier::label)
    }

    pub fn upgrade_flag(&self) -> u8 {
        u8::from(self.upgraded)
    }
}
