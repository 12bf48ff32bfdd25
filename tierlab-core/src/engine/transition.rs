//! Pure per-bar transition of the position state machine.
//!
//! Entry priority is strategic before tactical; while long, the upgrade check
//! runs before the exit checks, so a position promoted on this bar is already
//! immune to the tactical-only exits.

use super::rules::{
    macro_overheat, strategic_entry, tactical_entry, tactical_exit, BarContext, Probe,
};
use crate::config::SignalConfig;
use crate::domain::{
    ExitReason, FeatureKind, OpenPosition, PositionState, Signal, SignalRecord, Tier,
};

/// Advance the state by one bar and emit that bar's record.
pub fn step(
    state: PositionState,
    ctx: &BarContext,
    config: &SignalConfig,
) -> (PositionState, SignalRecord) {
    let mut probe = Probe::new();
    let (next, signal, tier, upgraded, exit_reason) = match state {
        PositionState::Flat => match enter(ctx, config, &mut probe) {
            Some(tier) => {
                tracing::debug!(index = ctx.index, %tier, close = ctx.close, "entry");
                let open = OpenPosition::new(tier, ctx.index, ctx.high, ctx.close);
                (PositionState::Long(open), Signal::Buy, Some(tier), false, None)
            }
            None => (PositionState::Flat, Signal::Hold, None, false, None),
        },
        PositionState::Long(mut open) => {
            let upgraded = open.tier == Tier::Tactical
                && probe.below(
                    FeatureKind::Breadth,
                    ctx.breadth.pct_above_ma20,
                    config.upgrade_breadth,
                )
                && open.upgrade();
            if upgraded {
                tracing::debug!(
                    index = ctx.index,
                    entry_index = open.entry_index,
                    breadth = ctx.breadth.pct_above_ma20,
                    "tactical position upgraded"
                );
            }

            let exit_reason = if macro_overheat(ctx, &config.exit, &mut probe) {
                Some(ExitReason::MacroOverheat)
            } else {
                match open.tier {
                    Tier::Strategic => None,
                    Tier::Tactical => tactical_exit(ctx, &open, config, &mut probe),
                }
            };

            match exit_reason {
                Some(reason) => {
                    tracing::debug!(
                        index = ctx.index,
                        tier = %open.tier,
                        ?reason,
                        bars_held = ctx.index - open.entry_index,
                        "exit"
                    );
                    (PositionState::Flat, Signal::Sell, Some(open.tier), upgraded, Some(reason))
                }
                None => {
                    open.hold(ctx.close);
                    (PositionState::Long(open), Signal::Hold, Some(open.tier), upgraded, None)
                }
            }
        }
    };

    let record = SignalRecord {
        date: ctx.date,
        signal,
        tier,
        upgraded,
        regime: ctx.regime,
        exit_reason,
        indeterminate: probe.into_marks(),
    };
    (next, record)
}

fn enter(ctx: &BarContext, config: &SignalConfig, probe: &mut Probe) -> Option<Tier> {
    if !ctx.entries_allowed {
        return None;
    }
    if strategic_entry(ctx, config, probe) {
        Some(Tier::Strategic)
    } else if tactical_entry(ctx, config, probe) {
        Some(Tier::Tactical)
    } else {
        None
    }
}
