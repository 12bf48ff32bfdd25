//! Regime classifier: bull when the index MA20 sits above its MA60.
//!
//! Descriptive only under the default exit rules; the regime-gated exit rule
//! set picks its overheat thresholds from it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Bull,
    Bear,
    /// Either moving average is still warming up.
    Undetermined,
}

impl Regime {
    pub fn classify(ma20: f64, ma60: f64) -> Self {
        if ma20.is_nan() || ma60.is_nan() {
            Regime::Undetermined
        } else if ma20 > ma60 {
            Regime::Bull
        } else {
            Regime::Bear
        }
    }

    pub fn is_bull(self) -> bool {
        self == Regime::Bull
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Regime::Bull => "bull",
            Regime::Bear => "bear",
            Regime::Undetermined => "undetermined",
        };
        f.write_str(s)
    }
}
