//! Look-ahead contamination tests.
//!
//! Invariant: no value at bar t may depend on data from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..120) and on the full series
//! (bars 0..240). Assert bars 0..120 are identical between both runs. Any
//! difference means future data is leaking into past values.

mod common;

use common::{cyclic_breadth, make_test_bars};
use tierlab_core::config::HeatSource;
use tierlab_core::domain::Bar;
use tierlab_core::features::indicator_set;
use tierlab_core::indicators::Indicator;
use tierlab_core::{run_signals, SignalConfig};

const FULL: usize = 240;
const TRUNCATED: usize = 120;

fn same(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-10
}

/// Assert that the indicator produces identical values for bars 0..truncated_len
/// whether computed on a truncated or full series.
fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(&full_bars[..truncated_len]);

    assert_eq!(truncated_result.len(), truncated_len, "{}", indicator.name());
    assert_eq!(full_result.len(), full_bars.len(), "{}", indicator.name());

    for i in 0..truncated_len {
        let t = truncated_result[i];
        let f = full_result[i];
        assert!(
            same(t, f),
            "{}: look-ahead at bar {i} (truncated={t}, full={f})",
            indicator.name()
        );
    }
}

#[test]
fn no_indicator_looks_ahead() {
    let bars = make_test_bars(FULL);
    for source in [HeatSource::Volume, HeatSource::Amount] {
        let mut cfg = SignalConfig::default();
        cfg.heat.source = source;
        for indicator in indicator_set(&cfg) {
            assert_no_lookahead(indicator.as_ref(), &bars, TRUNCATED);
        }
    }
}

#[test]
fn signal_series_prefix_is_stable() {
    let bars = make_test_bars(FULL);
    let breadth = cyclic_breadth(&bars);
    let cfg = SignalConfig::default();

    let full = run_signals(&bars, &breadth, &cfg).unwrap();
    let truncated = run_signals(&bars[..TRUNCATED], &breadth, &cfg).unwrap();

    assert_eq!(truncated.len(), TRUNCATED);
    assert_eq!(&full.records[..TRUNCATED], &truncated.records[..]);
    for i in 0..TRUNCATED {
        let (f, t) = (&full.features[i], &truncated.features[i]);
        assert!(same(f.ma30, t.ma30), "ma30 differs at bar {i}");
        assert!(same(f.heat_z, t.heat_z), "heat_z differs at bar {i}");
        assert_eq!(f.streak, t.streak, "streak differs at bar {i}");
    }
}

#[test]
fn breadth_after_the_last_bar_is_ignored() {
    let bars = make_test_bars(FULL);
    let breadth = cyclic_breadth(&bars);
    let cfg = SignalConfig::default();

    // Breadth history runs to bar 240 in both cases; only prices are cut.
    let truncated = run_signals(&bars[..TRUNCATED], &breadth, &cfg).unwrap();
    let last = truncated.breadth.last().unwrap();
    assert_eq!(last.source_date, Some(bars[TRUNCATED - 1].date));
}
