//! Two-phase signal run.
//!
//! 1. Feature pass: indicators on the rayon pool, breadth aligned alongside.
//! 2. Fold: one strict left-to-right pass of `step` over the bars.

use crate::breadth::{align_breadth, BreadthHistory};
use crate::config::SignalConfig;
use crate::domain::{Bar, BreadthReading, PositionState, Signal, SignalRecord};
use crate::features::{compute_features, DerivedFeatures};
use crate::regime::Regime;

use super::rules::BarContext;
use super::transition::step;
use super::validate::{check_order, validate_inputs, EngineError};
use super::warmup::WarmupState;

use serde::Serialize;

/// Data quality threshold: warn if void bar rate exceeds this fraction.
const VOID_BAR_RATE_THRESHOLD: f64 = 0.10;

/// Output of a run, aligned one-to-one with the input bars.
#[derive(Debug, Clone, Serialize)]
pub struct SignalSeries {
    pub records: Vec<SignalRecord>,
    pub features: Vec<DerivedFeatures>,
    pub breadth: Vec<BreadthReading>,
    pub warmup_bars: usize,
    /// Fewer bars than the longest rolling window.
    pub insufficient_history: bool,
    pub final_state: PositionState,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.records.iter().map(|r| r.signal).collect()
    }

    pub fn last(&self) -> Option<&SignalRecord> {
        self.records.last()
    }

    pub fn buy_count(&self) -> usize {
        self.records.iter().filter(|r| r.signal == Signal::Buy).count()
    }
}

/// Records and terminal state of a fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub records: Vec<SignalRecord>,
    pub final_state: PositionState,
}

/// Configured signal engine.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    config: SignalConfig,
}

impl SignalEngine {
    pub fn new(config: SignalConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    /// Run both phases over a price series and its breadth history.
    pub fn run(&self, bars: &[Bar], history: &BreadthHistory) -> Result<SignalSeries, EngineError> {
        validate_inputs(bars, history, &self.config)?;
        warn_on_void_bars(bars);

        let (feature_set, breadth) = rayon::join(
            || compute_features(bars, &self.config),
            || align_breadth(bars, history),
        );

        let warmup_bars = feature_set.warmup_bars;
        let insufficient_history = feature_set.insufficient_history();
        if insufficient_history {
            tracing::warn!(
                bars = bars.len(),
                warmup_bars,
                "insufficient history: series shorter than the longest rolling window"
            );
        }

        let fold = fold_signals(bars, &feature_set.rows, &breadth, &self.config, warmup_bars)?;
        tracing::info!(
            bars = bars.len(),
            buys = fold.records.iter().filter(|r| r.signal == Signal::Buy).count(),
            sells = fold.records.iter().filter(|r| r.signal == Signal::Sell).count(),
            long_at_end = fold.final_state.is_long(),
            "signal run complete"
        );

        Ok(SignalSeries {
            records: fold.records,
            features: feature_set.rows,
            breadth,
            warmup_bars,
            insufficient_history,
            final_state: fold.final_state,
        })
    }
}

/// One-shot convenience over `SignalEngine`.
pub fn run_signals(
    bars: &[Bar],
    history: &BreadthHistory,
    config: &SignalConfig,
) -> Result<SignalSeries, EngineError> {
    SignalEngine::new(config.clone())?.run(bars, history)
}

/// Fold the state machine over precomputed features and aligned breadth.
///
/// `warmup_bars` only gates entries when `config.strict_warmup` is set.
pub fn fold_signals(
    bars: &[Bar],
    features: &[DerivedFeatures],
    breadth: &[BreadthReading],
    config: &SignalConfig,
    warmup_bars: usize,
) -> Result<Fold, EngineError> {
    check_len("features", bars.len(), features.len())?;
    check_len("breadth", bars.len(), breadth.len())?;
    check_order(bars)?;

    let mut warmup = WarmupState::new(warmup_bars);
    let mut state = PositionState::Flat;
    let mut records = Vec::with_capacity(bars.len());

    for (t, bar) in bars.iter().enumerate() {
        let f = features[t];
        let ctx = BarContext {
            index: t,
            date: bar.date,
            high: bar.high,
            close: bar.close,
            prev_close: t.checked_sub(1).map(|p| bars[p].close),
            features: f,
            prior_streak: t.checked_sub(1).map(|p| features[p].streak),
            breadth: breadth[t],
            regime: Regime::classify(f.ma20, f.ma60),
            entries_allowed: !config.strict_warmup || warmup.is_warm(),
        };
        let (next, record) = step(state, &ctx, config);
        state = next;
        records.push(record);
        warmup.process_bar();
    }

    Ok(Fold {
        records,
        final_state: state,
    })
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), EngineError> {
    if expected == actual {
        Ok(())
    } else {
        Err(EngineError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}

fn warn_on_void_bars(bars: &[Bar]) {
    if bars.is_empty() {
        return;
    }
    let void = bars.iter().filter(|b| b.is_void()).count();
    let rate = void as f64 / bars.len() as f64;
    if rate > VOID_BAR_RATE_THRESHOLD {
        tracing::warn!(void, bars = bars.len(), rate, "high void bar rate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BreadthSnapshot;
    use crate::indicators::make_bars;

    fn flat_history(bars: &[Bar], pct: f64) -> BreadthHistory {
        bars.iter()
            .map(|b| BreadthSnapshot {
                date: b.date,
                pct_above_ma20: pct,
                pct_new_high: 5.0,
            })
            .collect()
    }

    fn ramp(n: usize) -> Vec<Bar> {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        make_bars(&closes)
    }

    #[test]
    fn records_align_with_bars() {
        let bars = ramp(90);
        let series = run_signals(&bars, &flat_history(&bars, 50.0), &SignalConfig::default())
            .unwrap();
        assert_eq!(series.len(), 90);
        assert_eq!(series.features.len(), 90);
        assert_eq!(series.breadth.len(), 90);
        for (r, b) in series.records.iter().zip(&bars) {
            assert_eq!(r.date, b.date);
        }
        assert!(!series.insufficient_history);
    }

    #[test]
    fn short_series_stays_flat_through_warmup() {
        let bars = ramp(10);
        let series = run_signals(&bars, &flat_history(&bars, 10.0), &SignalConfig::default())
            .unwrap();
        assert!(series.insufficient_history);
        assert_eq!(series.warmup_bars, 59);
        assert!(series.records.iter().all(|r| r.signal == Signal::Hold));
        assert!(!series.final_state.is_long());
    }

    #[test]
    fn low_breadth_enters_on_first_bar_without_strict_warmup() {
        let bars = ramp(10);
        let cfg = SignalConfig {
            strict_warmup: false,
            ..SignalConfig::default()
        };
        let series = run_signals(&bars, &flat_history(&bars, 10.0), &cfg).unwrap();
        assert_eq!(series.records[0].signal, Signal::Buy);
        assert_eq!(series.buy_count(), 1);
        assert!(series.final_state.is_long());
    }

    #[test]
    fn default_warmup_blocks_entries_until_warm() {
        let bars = ramp(70);
        let series =
            run_signals(&bars, &flat_history(&bars, 10.0), &SignalConfig::default()).unwrap();
        assert_eq!(series.warmup_bars, 59);
        assert!(series.records[..59].iter().all(|r| r.signal == Signal::Hold));
        assert_eq!(series.records[59].signal, Signal::Buy);
    }

    #[test]
    fn unfilled_windows_are_marked_when_warmup_gate_is_off() {
        let bars = ramp(20);
        let cfg = SignalConfig {
            strict_warmup: false,
            ..SignalConfig::default()
        };
        let series = run_signals(&bars, &flat_history(&bars, 50.0), &cfg).unwrap();
        assert!(series.insufficient_history);
        assert!(series.records.iter().all(|r| r.signal == Signal::Hold));
        assert!(series.records[0].indeterminate.contains(&crate::domain::FeatureKind::Ma30));
    }

    #[test]
    fn fold_rejects_length_mismatch() {
        let bars = ramp(5);
        let fs = compute_features(&bars, &SignalConfig::default());
        let err = fold_signals(&bars, &fs.rows, &[], &SignalConfig::default(), 0).unwrap_err();
        assert!(matches!(err, EngineError::LengthMismatch { what: "breadth", .. }));
    }

    #[test]
    fn engine_rejects_invalid_config() {
        let mut cfg = SignalConfig::default();
        cfg.strategic_entry_breadth = 140.0;
        assert!(SignalEngine::new(cfg).is_err());
    }
}
