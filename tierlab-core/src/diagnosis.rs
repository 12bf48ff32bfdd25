//! Latest-bar readout for the dashboard.
//!
//! Stateless: looks at one bar's features and breadth only. The sell test
//! always uses regime-gated thresholds, taken from the configuration when it
//! is regime-gated and from the stock bull/bear sets otherwise. A regime that
//! is not bull is judged with the bear thresholds.

use crate::config::{ExitRules, OverheatThresholds, SignalConfig};
use crate::domain::BreadthReading;
use crate::engine::SignalSeries;
use crate::features::DerivedFeatures;
use crate::regime::Regime;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    /// Breadth at a washout extreme.
    Buy,
    /// Overheat thresholds of the current regime fired.
    Sell,
    /// Bull regime without an extreme: let the position run.
    HoldForTrend,
    /// Neither extreme and no uptrend: wait.
    StandAside,
}

impl Advice {
    pub fn label(self) -> &'static str {
        match self {
            Advice::Buy => "buy",
            Advice::Sell => "sell",
            Advice::HoldForTrend => "hold for trend",
            Advice::StandAside => "stand aside",
        }
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Diagnosis {
    pub date: NaiveDate,
    pub regime: Regime,
    pub heat_z: f64,
    pub pct_above_ma20: f64,
    pub pct_new_high: f64,
    /// Date of the breadth snapshot the readout used.
    pub breadth_date: Option<NaiveDate>,
    /// Thresholds the sell test was run against.
    pub thresholds: OverheatThresholds,
    pub advice: Advice,
}

pub fn diagnose(
    features: &DerivedFeatures,
    breadth: &BreadthReading,
    config: &SignalConfig,
) -> Diagnosis {
    let regime = Regime::classify(features.ma20, features.ma60);
    let (bull, bear) = match config.exit {
        ExitRules::RegimeGated { bull, bear } => (bull, bear),
        ExitRules::Uniform(_) => (OverheatThresholds::BULL, OverheatThresholds::BEAR),
    };
    let thresholds = if regime.is_bull() { bull } else { bear };

    let breadth_pct = breadth.pct_above_ma20;
    let advice = if breadth_pct < config.strategic_entry_breadth {
        Advice::Buy
    } else if overheated(features.heat_z, breadth, &thresholds) {
        Advice::Sell
    } else if regime.is_bull() {
        Advice::HoldForTrend
    } else {
        Advice::StandAside
    };

    Diagnosis {
        date: features.date,
        regime,
        heat_z: features.heat_z,
        pct_above_ma20: breadth_pct,
        pct_new_high: breadth.pct_new_high,
        breadth_date: breadth.source_date,
        thresholds,
        advice,
    }
}

/// Readout for the last bar of a run.
pub fn diagnose_latest(series: &SignalSeries, config: &SignalConfig) -> Option<Diagnosis> {
    let features = series.features.last()?;
    let breadth = series.breadth.last()?;
    Some(diagnose(features, breadth, config))
}

// NaN operands compare false, so an indeterminate input never reads as overheated.
fn overheated(heat_z: f64, breadth: &BreadthReading, t: &OverheatThresholds) -> bool {
    breadth.pct_above_ma20 > t.breadth_above
        && heat_z < t.heat_below
        && t.new_high_below.map_or(true, |limit| breadth.pct_new_high < limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(ma20: f64, ma60: f64, heat_z: f64) -> DerivedFeatures {
        DerivedFeatures {
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            ma5: f64::NAN,
            ma10: f64::NAN,
            ma20,
            ma30: f64::NAN,
            ma60,
            streak: 0,
            heat_z,
            turnover_pct: f64::NAN,
        }
    }

    fn breadth(pct: f64, new_high: f64) -> BreadthReading {
        BreadthReading {
            pct_above_ma20: pct,
            pct_new_high: new_high,
            source_date: NaiveDate::from_ymd_opt(2025, 6, 30),
        }
    }

    #[test]
    fn washout_is_buy_in_any_regime() {
        let cfg = SignalConfig::default();
        let d = diagnose(&features(90.0, 100.0, 0.0), &breadth(12.0, 1.0), &cfg);
        assert_eq!(d.advice, Advice::Buy);
        assert_eq!(d.regime, Regime::Bear);
        assert_eq!(d.breadth_date, NaiveDate::from_ymd_opt(2025, 6, 30));
    }

    #[test]
    fn bull_overheat_needs_fading_new_highs() {
        let cfg = SignalConfig::default();
        let f = features(110.0, 100.0, 1.2);
        assert_eq!(diagnose(&f, &breadth(82.0, 8.0), &cfg).advice, Advice::Sell);
        assert_eq!(
            diagnose(&f, &breadth(82.0, 12.0), &cfg).advice,
            Advice::HoldForTrend
        );
    }

    #[test]
    fn bear_rally_sells_early() {
        let cfg = SignalConfig::default();
        let f = features(95.0, 100.0, 0.5);
        assert_eq!(diagnose(&f, &breadth(45.0, 20.0), &cfg).advice, Advice::Sell);
        assert_eq!(
            diagnose(&f, &breadth(35.0, 20.0), &cfg).advice,
            Advice::StandAside
        );
    }

    #[test]
    fn undetermined_regime_uses_bear_thresholds() {
        let d = diagnose(
            &features(f64::NAN, 100.0, 0.5),
            &breadth(45.0, 20.0),
            &SignalConfig::default(),
        );
        assert_eq!(d.regime, Regime::Undetermined);
        assert_eq!(d.thresholds, OverheatThresholds::BEAR);
        assert_eq!(d.advice, Advice::Sell);
    }

    #[test]
    fn configured_gated_thresholds_are_used() {
        let mut cfg = SignalConfig::default();
        cfg.exit = ExitRules::RegimeGated {
            bull: OverheatThresholds {
                breadth_above: 70.0,
                heat_below: 2.0,
                new_high_below: None,
            },
            bear: OverheatThresholds::BEAR,
        };
        let d = diagnose(&features(110.0, 100.0, 1.8), &breadth(75.0, 30.0), &cfg);
        assert_eq!(d.advice, Advice::Sell);
    }

    #[test]
    fn indeterminate_heat_never_sells() {
        let d = diagnose(
            &features(110.0, 100.0, f64::NAN),
            &breadth(90.0, 1.0),
            &SignalConfig::default(),
        );
        assert_eq!(d.advice, Advice::HoldForTrend);
    }
}
