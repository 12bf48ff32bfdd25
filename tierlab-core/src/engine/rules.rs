//! Entry and exit rules, evaluated against one bar's context.
//!
//! Every comparison goes through `Probe`, which turns an indeterminate (NaN)
//! operand into `false` and records which input it was. Rules short-circuit,
//! so only the inputs actually consulted on a bar are recorded.

use crate::config::{ExitRules, SignalConfig};
use crate::domain::{BreadthReading, ExitReason, FeatureKind, OpenPosition};
use crate::features::DerivedFeatures;
use crate::regime::Regime;
use chrono::NaiveDate;

/// Everything the state machine may look at on bar `index`.
#[derive(Debug, Clone, Copy)]
pub struct BarContext {
    pub index: usize,
    pub date: NaiveDate,
    pub high: f64,
    pub close: f64,
    /// Close of the previous bar; `None` on the first bar.
    pub prev_close: Option<f64>,
    pub features: DerivedFeatures,
    /// Gain streak of the previous bar; `None` on the first bar.
    pub prior_streak: Option<u32>,
    pub breadth: BreadthReading,
    pub regime: Regime,
    /// False while strict warmup is blocking entries.
    pub entries_allowed: bool,
}

/// Comparison helper that records indeterminate inputs.
#[derive(Debug, Default)]
pub struct Probe {
    marks: Vec<FeatureKind>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, kind: FeatureKind) {
        if !self.marks.contains(&kind) {
            self.marks.push(kind);
        }
    }

    fn known(&mut self, kind: FeatureKind, value: f64) -> Option<f64> {
        if value.is_nan() {
            self.mark(kind);
            None
        } else {
            Some(value)
        }
    }

    /// `lhs < rhs`, false if either side is indeterminate.
    pub fn less(&mut self, lhs: (FeatureKind, f64), rhs: (FeatureKind, f64)) -> bool {
        let l = self.known(lhs.0, lhs.1);
        let r = self.known(rhs.0, rhs.1);
        matches!((l, r), (Some(l), Some(r)) if l < r)
    }

    /// `lhs > rhs`, false if either side is indeterminate.
    pub fn greater(&mut self, lhs: (FeatureKind, f64), rhs: (FeatureKind, f64)) -> bool {
        let l = self.known(lhs.0, lhs.1);
        let r = self.known(rhs.0, rhs.1);
        matches!((l, r), (Some(l), Some(r)) if l > r)
    }

    /// `value < threshold` for a configured threshold.
    pub fn below(&mut self, kind: FeatureKind, value: f64, threshold: f64) -> bool {
        self.known(kind, value).is_some_and(|v| v < threshold)
    }

    /// `value > threshold` for a configured threshold.
    pub fn above(&mut self, kind: FeatureKind, value: f64, threshold: f64) -> bool {
        self.known(kind, value).is_some_and(|v| v > threshold)
    }

    /// Recorded inputs in a stable order.
    pub fn into_marks(mut self) -> Vec<FeatureKind> {
        self.marks.sort();
        self.marks
    }
}

/// Macro-extreme entry: breadth collapse.
pub fn strategic_entry(ctx: &BarContext, config: &SignalConfig, probe: &mut Probe) -> bool {
    probe.below(
        FeatureKind::Breadth,
        ctx.breadth.pct_above_ma20,
        config.strategic_entry_breadth,
    )
}

/// Pullback entry: first down day after a run, above the short and medium averages.
pub fn tactical_entry(ctx: &BarContext, config: &SignalConfig, probe: &mut Probe) -> bool {
    let f = &ctx.features;
    let close = (FeatureKind::Close, ctx.close);

    probe.greater(close, (FeatureKind::Ma30, f.ma30))
        && probe.greater(close, (FeatureKind::Ma10, f.ma10))
        && probe.greater(close, (FeatureKind::Ma5, f.ma5))
        && match ctx.prior_streak {
            Some(streak) => streak >= config.tactical.min_prior_streak,
            None => {
                probe.mark(FeatureKind::PriorStreak);
                false
            }
        }
        && probe.less(close, prior_close(ctx))
        && probe.above(
            FeatureKind::Turnover,
            f.turnover_pct,
            config.tactical.min_turnover_pct,
        )
}

/// Breadth overheated while heat faded, under the thresholds of the bar's regime.
pub fn macro_overheat(ctx: &BarContext, rules: &ExitRules, probe: &mut Probe) -> bool {
    let Some(t) = rules.thresholds_for(ctx.regime) else {
        probe.mark(FeatureKind::Regime);
        return false;
    };

    probe.above(FeatureKind::Breadth, ctx.breadth.pct_above_ma20, t.breadth_above)
        && probe.below(FeatureKind::HeatZ, ctx.features.heat_z, t.heat_below)
        && t.new_high_below.map_or(true, |limit| {
            probe.below(FeatureKind::NewHigh, ctx.breadth.pct_new_high, limit)
        })
}

/// Tactical-only exits: a close under MA30 that is either a down day or comes
/// after the holding window without any close above the entry bar's high.
pub fn tactical_exit(
    ctx: &BarContext,
    position: &OpenPosition,
    config: &SignalConfig,
    probe: &mut Probe,
) -> Option<ExitReason> {
    let close = (FeatureKind::Close, ctx.close);
    if !probe.less(close, (FeatureKind::Ma30, ctx.features.ma30)) {
        return None;
    }
    if probe.less(close, prior_close(ctx)) {
        return Some(ExitReason::TrendBreak);
    }
    let stale = position.holding_days >= config.time_stop_days
        && position.max_close_since_entry <= position.entry_high;
    stale.then_some(ExitReason::TimeStop)
}

fn prior_close(ctx: &BarContext) -> (FeatureKind, f64) {
    (FeatureKind::PriorClose, ctx.prev_close.unwrap_or(f64::NAN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverheatThresholds;
    use crate::domain::Tier;

    fn features() -> DerivedFeatures {
        DerivedFeatures {
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            ma5: 103.0,
            ma10: 102.0,
            ma20: 101.0,
            ma30: 100.0,
            ma60: 98.0,
            streak: 0,
            heat_z: 0.5,
            turnover_pct: 1.2,
        }
    }

    fn ctx() -> BarContext {
        BarContext {
            index: 10,
            date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
            high: 106.0,
            close: 105.0,
            prev_close: Some(106.0),
            features: features(),
            prior_streak: Some(3),
            breadth: BreadthReading {
                pct_above_ma20: 50.0,
                pct_new_high: 5.0,
                source_date: None,
            },
            regime: Regime::Bull,
            entries_allowed: true,
        }
    }

    #[test]
    fn probe_records_nan_operands_once() {
        let mut p = Probe::new();
        assert!(!p.less((FeatureKind::Close, 1.0), (FeatureKind::Ma30, f64::NAN)));
        assert!(!p.greater((FeatureKind::Close, 1.0), (FeatureKind::Ma30, f64::NAN)));
        assert!(!p.above(FeatureKind::HeatZ, f64::NAN, 0.0));
        assert_eq!(p.into_marks(), vec![FeatureKind::Ma30, FeatureKind::HeatZ]);
    }

    #[test]
    fn tactical_entry_pullback_fires() {
        let mut p = Probe::new();
        assert!(tactical_entry(&ctx(), &SignalConfig::default(), &mut p));
        assert!(p.into_marks().is_empty());
    }

    #[test]
    fn tactical_entry_needs_prior_streak() {
        let mut c = ctx();
        c.prior_streak = Some(2);
        assert!(!tactical_entry(&c, &SignalConfig::default(), &mut Probe::new()));

        let mut cfg = SignalConfig::default();
        cfg.tactical.min_prior_streak = 2;
        assert!(tactical_entry(&c, &cfg, &mut Probe::new()));
    }

    #[test]
    fn tactical_entry_needs_down_day() {
        let mut c = ctx();
        c.prev_close = Some(104.0);
        assert!(!tactical_entry(&c, &SignalConfig::default(), &mut Probe::new()));
    }

    #[test]
    fn tactical_entry_turnover_gate_is_strict() {
        let mut c = ctx();
        c.features.turnover_pct = 1.0;
        assert!(!tactical_entry(&c, &SignalConfig::default(), &mut Probe::new()));
    }

    #[test]
    fn tactical_entry_first_bar_marks_prior_streak() {
        let mut c = ctx();
        c.prior_streak = None;
        c.prev_close = None;
        let mut p = Probe::new();
        assert!(!tactical_entry(&c, &SignalConfig::default(), &mut p));
        assert_eq!(p.into_marks(), vec![FeatureKind::PriorStreak]);
    }

    #[test]
    fn overheat_boundaries() {
        let rules = ExitRules::default();
        let mut c = ctx();
        c.breadth.pct_above_ma20 = 79.0;
        c.features.heat_z = 1.0;
        assert!(!macro_overheat(&c, &rules, &mut Probe::new()));

        c.breadth.pct_above_ma20 = 79.01;
        c.features.heat_z = 1.49;
        assert!(macro_overheat(&c, &rules, &mut Probe::new()));

        c.features.heat_z = 1.5;
        assert!(!macro_overheat(&c, &rules, &mut Probe::new()));
    }

    #[test]
    fn overheat_with_indeterminate_heat_is_false_and_marked() {
        let mut c = ctx();
        c.breadth.pct_above_ma20 = 85.0;
        c.features.heat_z = f64::NAN;
        let mut p = Probe::new();
        assert!(!macro_overheat(&c, &ExitRules::default(), &mut p));
        assert_eq!(p.into_marks(), vec![FeatureKind::HeatZ]);
    }

    #[test]
    fn regime_gated_overheat_uses_bear_thresholds() {
        let rules = ExitRules::regime_gated();
        let mut c = ctx();
        c.regime = Regime::Bear;
        c.breadth.pct_above_ma20 = 45.0;
        c.breadth.pct_new_high = 20.0;
        c.features.heat_z = 0.8;
        assert!(macro_overheat(&c, &rules, &mut Probe::new()));

        c.breadth.pct_new_high = 30.0;
        assert!(!macro_overheat(&c, &rules, &mut Probe::new()));
    }

    #[test]
    fn regime_gated_overheat_undetermined_regime() {
        let mut c = ctx();
        c.regime = Regime::Undetermined;
        c.breadth.pct_above_ma20 = 95.0;
        c.features.heat_z = 0.0;
        let mut p = Probe::new();
        assert!(!macro_overheat(&c, &ExitRules::regime_gated(), &mut p));
        assert_eq!(p.into_marks(), vec![FeatureKind::Regime]);

        let uniform = ExitRules::Uniform(OverheatThresholds::UNIFORM);
        assert!(macro_overheat(&c, &uniform, &mut Probe::new()));
    }

    #[test]
    fn tactical_exit_trend_break_and_time_stop() {
        let cfg = SignalConfig::default();
        let mut c = ctx();
        c.close = 99.0;
        c.prev_close = Some(100.0);
        let mut pos = OpenPosition::new(Tier::Tactical, 0, 110.0, 105.0);
        assert_eq!(
            tactical_exit(&c, &pos, &cfg, &mut Probe::new()),
            Some(ExitReason::TrendBreak)
        );

        c.prev_close = Some(98.0);
        assert_eq!(tactical_exit(&c, &pos, &cfg, &mut Probe::new()), None);

        pos.holding_days = 5;
        assert_eq!(
            tactical_exit(&c, &pos, &cfg, &mut Probe::new()),
            Some(ExitReason::TimeStop)
        );

        pos.max_close_since_entry = 111.0;
        assert_eq!(tactical_exit(&c, &pos, &cfg, &mut Probe::new()), None);
    }

    #[test]
    fn tactical_exit_needs_close_below_ma30() {
        let mut c = ctx();
        c.close = 101.0;
        c.prev_close = Some(104.0);
        let pos = OpenPosition::new(Tier::Tactical, 0, 110.0, 105.0);
        assert_eq!(
            tactical_exit(&c, &pos, &SignalConfig::default(), &mut Probe::new()),
            None
        );
    }
}
