//! Market breadth: history, alignment to the price timeline, universe scan.

pub mod align;
pub mod history;
pub mod scan;

pub use align::align_breadth;
pub use history::BreadthHistory;
pub use scan::{evaluate_stock, scan_universe, ScanOutcome, StockVerdict};
