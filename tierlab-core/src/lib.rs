//! TierLab Core: indicators, breadth, and the tiered signal state machine.
//!
//! This crate contains the whole signal pipeline:
//! - Domain types (bars, breadth, position state, signal records, trades)
//! - Indicator trait and the parallel feature pass
//! - Breadth history, forward-fill alignment and the universe scan
//! - Strategic/tactical state machine folded over the bars
//! - Trade bookkeeping, snapshot diagnosis and run fingerprints
//! - CSV loading and a synthetic data generator

pub mod breadth;
pub mod config;
pub mod data;
pub mod diagnosis;
pub mod domain;
pub mod engine;
pub mod features;
pub mod fingerprint;
pub mod indicators;
pub mod regime;
pub mod trades;

pub use config::{ConfigError, ExitRules, HeatSource, OverheatThresholds, SignalConfig};
pub use engine::{run_signals, EngineError, SignalEngine, SignalSeries};
