//! Trade extraction: pairs buy and sell bars into round-trip `TradeRecord`s.
//!
//! Post-processes the signal records after the fold completes. Pure function:
//! bars + records → trades. Prices are bar closes.

use crate::domain::{Bar, Signal, SignalRecord, Tier, TradeRecord};
use serde::{Deserialize, Serialize};

/// Entry side of a trade being tracked during extraction.
struct OpenTrade {
    tier: Tier,
    upgraded: bool,
    entry_bar: usize,
}

/// Extract round trips. A position still open on the last bar is reported as
/// an open trade marked to the last close.
pub fn extract_trades(bars: &[Bar], records: &[SignalRecord]) -> Vec<TradeRecord> {
    let mut trades = Vec::new();
    let mut open: Option<OpenTrade> = None;

    for (t, record) in records.iter().enumerate().take(bars.len()) {
        match record.signal {
            Signal::Buy if open.is_none() => {
                open = Some(OpenTrade {
                    tier: record.tier.unwrap_or(Tier::Tactical),
                    upgraded: false,
                    entry_bar: t,
                });
            }
            Signal::Hold => {
                if let Some(trade) = open.as_mut() {
                    if let Some(tier) = record.tier {
                        trade.tier = tier;
                    }
                    trade.upgraded |= record.upgraded;
                }
            }
            Signal::Sell => {
                if let Some(mut trade) = open.take() {
                    trade.upgraded |= record.upgraded;
                    let tier = record.tier.unwrap_or(trade.tier);
                    trades.push(build_trade_record(bars, &trade, tier, t, record));
                }
            }
            Signal::Buy => {}
        }
    }

    if let (Some(trade), Some(last)) = (open, records.len().min(bars.len()).checked_sub(1)) {
        let entry = &bars[trade.entry_bar];
        let exit = &bars[last];
        trades.push(TradeRecord {
            tier: trade.tier,
            upgraded: trade.upgraded,
            entry_bar: trade.entry_bar,
            entry_date: entry.date,
            entry_price: entry.close,
            exit_bar: last,
            exit_date: exit.date,
            exit_price: exit.close,
            exit_reason: None,
            open: true,
            bars_held: last - trade.entry_bar,
        });
    }

    trades
}

fn build_trade_record(
    bars: &[Bar],
    open: &OpenTrade,
    tier: Tier,
    exit_bar: usize,
    exit_record: &SignalRecord,
) -> TradeRecord {
    let entry = &bars[open.entry_bar];
    let exit = &bars[exit_bar];
    TradeRecord {
        tier,
        upgraded: open.upgraded,
        entry_bar: open.entry_bar,
        entry_date: entry.date,
        entry_price: entry.close,
        exit_bar,
        exit_date: exit.date,
        exit_price: exit.close,
        exit_reason: exit_record.exit_reason,
        open: false,
        bars_held: exit_bar.saturating_sub(open.entry_bar),
    }
}

/// Basic bookkeeping over a set of trades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    pub closed_trades: usize,
    pub winners: usize,
    /// Compounded return of closed trades, as a fraction.
    pub cumulative_return: f64,
    /// Mark-to-market return of a position still open at the end.
    pub open_return: Option<f64>,
}

impl TradeSummary {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let closed: Vec<&TradeRecord> = trades.iter().filter(|t| !t.is_open()).collect();
        Self {
            closed_trades: closed.len(),
            winners: closed.iter().filter(|t| t.is_winner()).count(),
            cumulative_return: cumulative_return(closed.iter().copied()),
            open_return: trades.iter().find(|t| t.is_open()).map(TradeRecord::return_pct),
        }
    }

    pub fn win_rate(&self) -> Option<f64> {
        (self.closed_trades > 0).then(|| self.winners as f64 / self.closed_trades as f64)
    }
}

/// Product of (1 + r) over the trades, minus one.
pub fn cumulative_return<'a>(trades: impl IntoIterator<Item = &'a TradeRecord>) -> f64 {
    trades
        .into_iter()
        .fold(1.0, |acc, t| acc * (1.0 + t.return_pct()))
        - 1.0
}
