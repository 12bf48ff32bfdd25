//! Market breadth readings produced by the daily universe scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's breadth scan result. Both fields are percentages on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreadthSnapshot {
    pub date: NaiveDate,
    #[serde(alias = "ma20_ratio")]
    pub pct_above_ma20: f64,
    #[serde(alias = "new_high_ratio")]
    pub pct_new_high: f64,
}

/// Breadth as seen by a single price bar after the forward-fill join.
///
/// `source_date` is the date of the snapshot that was carried forward; `None`
/// means no snapshot existed yet and both percentages are NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreadthReading {
    pub pct_above_ma20: f64,
    pub pct_new_high: f64,
    pub source_date: Option<NaiveDate>,
}

impl BreadthReading {
    pub fn missing() -> Self {
        Self {
            pct_above_ma20: f64::NAN,
            pct_new_high: f64::NAN,
            source_date: None,
        }
    }

    pub fn from_snapshot(snapshot: &BreadthSnapshot) -> Self {
        Self {
            pct_above_ma20: snapshot.pct_above_ma20,
            pct_new_high: snapshot.pct_new_high,
            source_date: Some(snapshot.date),
        }
    }

    /// True when the reading was carried forward from an earlier snapshot.
    pub fn is_stale(&self, bar_date: NaiveDate) -> bool {
        self.source_date.is_some_and(|d| d < bar_date)
    }
}
