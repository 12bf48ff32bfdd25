//! Input checks run before the feature pass.

use crate::breadth::BreadthHistory;
use crate::config::{ConfigError, HeatSource, SignalConfig};
use crate::domain::Bar;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("missing data for '{column}': {detail}")]
    MissingData { column: &'static str, detail: String },

    #[error("bar {index} dated {date} does not follow {prev}")]
    UnorderedBars {
        index: usize,
        date: NaiveDate,
        prev: NaiveDate,
    },

    #[error("{what} has {actual} rows, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Reject inputs the fold cannot run on.
pub fn validate_inputs(
    bars: &[Bar],
    breadth: &BreadthHistory,
    config: &SignalConfig,
) -> Result<(), EngineError> {
    config.validate()?;
    check_order(bars)?;

    if breadth.is_empty() {
        return Err(EngineError::MissingData {
            column: "breadth",
            detail: "breadth history is empty".into(),
        });
    }

    if !bars.is_empty() && bars.iter().all(|b| b.turnover_raw.is_nan()) {
        return Err(EngineError::MissingData {
            column: "turnover",
            detail: "no bar carries a turnover value".into(),
        });
    }

    if config.heat.source == HeatSource::Amount {
        if let Some(bar) = bars.iter().find(|b| b.amount.is_none()) {
            return Err(EngineError::MissingData {
                column: "amount",
                detail: format!("heat source is amount but bar {} has none", bar.date),
            });
        }
    }

    Ok(())
}

/// Dates must be strictly increasing.
pub fn check_order(bars: &[Bar]) -> Result<(), EngineError> {
    for (index, pair) in bars.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(EngineError::UnorderedBars {
                index: index + 1,
                date: pair[1].date,
                prev: pair[0].date,
            });
        }
    }
    Ok(())
}
