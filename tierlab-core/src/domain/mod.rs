//! Domain types for tierlab

pub mod bar;
pub mod breadth;
pub mod ids;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use breadth::{BreadthReading, BreadthSnapshot};
pub use ids::{ConfigHash, DatasetHash};
pub use position::{OpenPosition, PositionState};
pub use signal::{ExitReason, FeatureKind, Signal, SignalRecord, Tier};
pub use trade::TradeRecord;
