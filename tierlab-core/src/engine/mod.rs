//! Signal engine: tiered position state machine folded over the bars.
//!
//! The engine consumes a price series and its breadth history, runs the
//! parallel feature pass, then folds `step` over the bars:
//!
//! 1. Flat: strategic entry, else tactical entry
//! 2. Long: upgrade check, then macro overheat, then tactical-only exits
//! 3. Otherwise hold and advance the position metadata

pub mod loop_runner;
pub mod rules;
pub mod transition;
pub mod validate;
pub mod warmup;

pub use loop_runner::{fold_signals, run_signals, Fold, SignalEngine, SignalSeries};
pub use rules::{BarContext, Probe};
pub use transition::step;
pub use validate::{validate_inputs, EngineError};
pub use warmup::WarmupState;
