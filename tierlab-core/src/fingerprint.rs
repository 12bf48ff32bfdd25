//! Run fingerprinting: deterministic identification of a signal run.
//!
//! - `ConfigHash`: exact identity of the parameter set.
//! - `DatasetHash`: exact identity of the price and breadth inputs.
//! - `RunManifest`: both hashes plus the covered date range.

use crate::breadth::BreadthHistory;
use crate::config::SignalConfig;
use crate::domain::{Bar, ConfigHash, DatasetHash};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Hash every input field in order. Amount is tagged so that a missing value
/// and a zero hash differently.
pub fn dataset_hash(bars: &[Bar], breadth: &BreadthHistory) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();

    hasher.update(b"bars");
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
        match bar.amount {
            Some(amount) => {
                hasher.update(&[1]);
                hasher.update(&amount.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&bar.turnover_raw.to_le_bytes());
    }

    hasher.update(b"breadth");
    for snapshot in breadth.iter() {
        hasher.update(snapshot.date.to_string().as_bytes());
        hasher.update(&snapshot.pct_above_ma20.to_le_bytes());
        hasher.update(&snapshot.pct_new_high.to_le_bytes());
    }

    DatasetHash::from_hasher(&hasher)
}

/// Identity of one run, suitable for logging next to its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub config_hash: ConfigHash,
    pub dataset_hash: DatasetHash,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: usize,
    pub breadth_count: usize,
}

impl RunManifest {
    pub fn new(config: &SignalConfig, bars: &[Bar], breadth: &BreadthHistory) -> Self {
        Self {
            config_hash: config.config_hash(),
            dataset_hash: dataset_hash(bars, breadth),
            start_date: bars.first().map(|b| b.date),
            end_date: bars.last().map(|b| b.date),
            bar_count: bars.len(),
            breadth_count: breadth.len(),
        }
    }
}
