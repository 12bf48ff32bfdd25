//! Rolling-window primitives shared by the moving averages and the heat score.
//!
//! A window containing any NaN produces NaN. Output length equals input length.

/// Trailing mean over `period` values; NaN for the first `period - 1` slots.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    assert!(period >= 1, "rolling period must be >= 1");
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if n < period {
        return out;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            nan_count += 1;
        } else {
            sum += v;
        }
        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }
        if i + 1 >= period && nan_count == 0 {
            out[i] = sum / period as f64;
        }
    }

    out
}

/// Trailing mean and sample standard deviation (n - 1 denominator).
///
/// Computed per window in two passes; windows of a few dozen bars keep this cheap.
pub fn rolling_mean_std(values: &[f64], period: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(period >= 2, "rolling std period must be >= 2");
    let n = values.len();
    let mut means = vec![f64::NAN; n];
    let mut stds = vec![f64::NAN; n];

    for end in (period - 1)..n {
        let window = &values[end + 1 - period..=end];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = window.iter().sum::<f64>() / period as f64;
        let var = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        means[end] = mean;
        stds[end] = var.sqrt();
    }

    (means, stds)
}
