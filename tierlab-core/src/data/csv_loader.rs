//! CSV readers and the breadth-history writer.
//!
//! Columns are located by header name (case-insensitive), so column order and
//! extra columns do not matter. An empty numeric cell reads as NaN.

use super::DataError;
use crate::breadth::BreadthHistory;
use crate::domain::{Bar, BreadthSnapshot};
use chrono::NaiveDate;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header positions, looked up by normalized name.
struct Header {
    names: Vec<String>,
}

impl Header {
    fn new(record: &csv::StringRecord) -> Self {
        Self {
            names: record.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
        }
    }

    fn find(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| self.names.iter().position(|n| n == c))
    }

    fn require(&self, candidates: &[&str]) -> Result<usize, DataError> {
        self.find(candidates).ok_or_else(|| DataError::MissingColumn {
            column: candidates.join(" | "),
        })
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.split([' ', 'T']).next().unwrap_or(raw);
    NaiveDate::parse_from_str(day, DATE_FORMAT).ok()
}

fn parse_f64(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, DataError> {
    let raw = record.get(idx).unwrap_or("").trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| DataError::Parse {
        row,
        column,
        value: raw.to_string(),
    })
}

fn parse_opt(
    record: &csv::StringRecord,
    idx: Option<usize>,
    row: usize,
    column: &'static str,
) -> Result<f64, DataError> {
    match idx {
        Some(i) => parse_f64(record, i, row, column),
        None => Ok(f64::NAN),
    }
}

fn open_file(path: &Path) -> Result<std::fs::File, DataError> {
    std::fs::File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Read an index price series. Rows keep file order; ordering is checked by
/// the engine.
pub fn read_price_csv<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::new(rdr.headers()?);

    let date = header.require(&["date"])?;
    let open = header.require(&["open"])?;
    let high = header.require(&["high"])?;
    let low = header.require(&["low"])?;
    let close = header.require(&["close"])?;
    let volume = header.require(&["volume"])?;
    let turnover = header.require(&["turnover"])?;
    let amount = header.find(&["amount"]);

    let mut bars = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let raw_date = record.get(date).unwrap_or("");
        let bar_date = parse_date(raw_date).ok_or_else(|| DataError::Parse {
            row,
            column: "date",
            value: raw_date.to_string(),
        })?;
        let amount = match amount {
            Some(idx) => Some(parse_f64(&record, idx, row, "amount")?).filter(|v| !v.is_nan()),
            None => None,
        };

        bars.push(Bar {
            date: bar_date,
            open: parse_f64(&record, open, row, "open")?,
            high: parse_f64(&record, high, row, "high")?,
            low: parse_f64(&record, low, row, "low")?,
            close: parse_f64(&record, close, row, "close")?,
            volume: parse_f64(&record, volume, row, "volume")?,
            amount,
            turnover_raw: parse_f64(&record, turnover, row, "turnover")?,
        });
    }

    tracing::debug!(bars = bars.len(), "price csv loaded");
    Ok(bars)
}

pub fn load_price_csv(path: &Path) -> Result<Vec<Bar>, DataError> {
    let bars = read_price_csv(open_file(path)?)?;
    if bars.is_empty() {
        return Err(DataError::Empty(path.display().to_string()));
    }
    Ok(bars)
}

/// Read a constituent's history for the breadth scan. Only date, high and
/// close are required; rows with a bad date are skipped. Rows are sorted.
pub fn read_stock_csv<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::new(rdr.headers()?);

    let date = header.require(&["date"])?;
    let high = header.require(&["high"])?;
    let close = header.require(&["close"])?;
    let open = header.find(&["open"]);
    let low = header.find(&["low"]);
    let volume = header.find(&["volume"]);
    let turnover = header.find(&["turnover"]);

    let mut bars = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let Some(bar_date) = parse_date(record.get(date).unwrap_or("")) else {
            continue;
        };
        bars.push(Bar {
            date: bar_date,
            open: parse_opt(&record, open, row, "open")?,
            high: parse_f64(&record, high, row, "high")?,
            low: parse_opt(&record, low, row, "low")?,
            close: parse_f64(&record, close, row, "close")?,
            volume: parse_opt(&record, volume, row, "volume")?,
            amount: None,
            turnover_raw: parse_opt(&record, turnover, row, "turnover")?,
        });
    }
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Load every `*.csv` in a directory as one constituent, in file-name order.
/// Files that fail to parse are skipped with a warning.
pub fn load_universe_dir(dir: &Path) -> Result<Vec<(String, Vec<Bar>)>, DataError> {
    let entries = std::fs::read_dir(dir).map_err(|source| DataError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    paths.sort();

    let mut universe = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match open_file(&path).and_then(read_stock_csv) {
            Ok(bars) => universe.push((name, bars)),
            Err(e) => tracing::warn!(file = %path.display(), error = %e, "skipping constituent"),
        }
    }
    tracing::debug!(constituents = universe.len(), "universe loaded");
    Ok(universe)
}

/// Read a breadth history. Rows with an unparseable date are dropped,
/// duplicate dates keep the last row, and the result is date-sorted.
pub fn read_breadth_csv<R: Read>(reader: R) -> Result<BreadthHistory, DataError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = Header::new(rdr.headers()?);

    let date = header.require(&["date"])?;
    let above = header.require(&["pct_above_ma20", "ma20_ratio"])?;
    let new_high = header.require(&["pct_new_high", "new_high_ratio"])?;

    let mut history = BreadthHistory::new();
    let mut dropped = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let Some(snapshot_date) = parse_date(record.get(date).unwrap_or("")) else {
            dropped += 1;
            continue;
        };
        history.upsert(BreadthSnapshot {
            date: snapshot_date,
            pct_above_ma20: parse_f64(&record, above, row, "pct_above_ma20")?,
            pct_new_high: parse_f64(&record, new_high, row, "pct_new_high")?,
        });
    }

    if dropped > 0 {
        tracing::warn!(dropped, "breadth rows with unparseable dates dropped");
    }
    Ok(history)
}

pub fn load_breadth_csv(path: &Path) -> Result<BreadthHistory, DataError> {
    read_breadth_csv(open_file(path)?)
}

/// Write a breadth history using the scan file's column names.
pub fn write_breadth_csv<W: Write>(writer: W, history: &BreadthHistory) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "ma20_ratio", "new_high_ratio"])?;
    for snapshot in history.iter() {
        wtr.write_record([
            snapshot.date.format(DATE_FORMAT).to_string(),
            snapshot.pct_above_ma20.to_string(),
            snapshot.pct_new_high.to_string(),
        ])?;
    }
    wtr.flush().map_err(|source| DataError::Io {
        path: "breadth csv".into(),
        source,
    })?;
    Ok(())
}

/// Merge a snapshot into the breadth file at `path`, creating it if needed.
/// A snapshot for an existing date replaces that row.
pub fn append_breadth_snapshot(
    path: &Path,
    snapshot: BreadthSnapshot,
) -> Result<BreadthHistory, DataError> {
    let mut history = if path.exists() {
        load_breadth_csv(path)?
    } else {
        BreadthHistory::new()
    };
    history.upsert(snapshot);

    // Write to .tmp then rename, so a failed write leaves the old file intact.
    let tmp_path = path.with_extension("csv.tmp");
    let io_err = |p: &Path, source: std::io::Error| DataError::Io {
        path: p.display().to_string(),
        source,
    };
    let file = std::fs::File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = write_breadth_csv(file, &history) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        io_err(path, e)
    })?;
    Ok(history)
}
