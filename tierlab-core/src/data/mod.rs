//! Data loading: CSV readers and the synthetic generator.
//!
//! Fetching index and constituent history is done elsewhere; this module only
//! turns files the fetchers wrote into `Bar`s and `BreadthHistory`.

pub mod csv_loader;
pub mod synthetic;

pub use csv_loader::{
    append_breadth_snapshot, load_breadth_csv, load_price_csv, load_universe_dir,
    read_breadth_csv, read_price_csv, read_stock_csv, write_breadth_csv,
};
pub use synthetic::{generate_synthetic_breadth, generate_synthetic_index, SyntheticSpec};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("row {row}: cannot parse {column} from '{value}'")]
    Parse {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no usable rows in {0}")]
    Empty(String),
}
