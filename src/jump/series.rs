//! Numeric passes over sequences sampled on a uniform 1 ms clock.
//!
//! Missing samples are `None`. They appear at the edges of a sequence
//! (first difference, backward shift) and are never turned into errors.

/// Linearly interpolates `(timestamp, value)` samples onto a uniform 1 ms grid
/// spanning from the first to the last timestamp (both inclusive).
///
/// Samples must be ordered by timestamp. For duplicate timestamps the latest sample wins.
/// Returns an empty vector for empty input, and for a grid which would be longer than `max_len`
/// or can not be represented at all.
pub fn resample_linear(samples: &[(i64, f64)], max_len: usize) -> Vec<f64> {
    let mut knots: Vec<(i64, f64)> = Vec::with_capacity(samples.len());
    for &(t, v) in samples {
        match knots.last_mut() {
            Some(last) if last.0 == t => last.1 = v,
            _ => knots.push((t, v)),
        }
    }
    let (first, last) = match (knots.first(), knots.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => return vec![],
    };
    let grid_len = match last
        .checked_sub(first)
        .and_then(|d| d.checked_add(1))
        .and_then(|d| usize::try_from(d).ok())
    {
        Some(n) if n <= max_len => n,
        _ => return vec![],
    };
    let mut grid = Vec::with_capacity(grid_len);
    for window in knots.windows(2) {
        let (t0, y0) = window[0];
        let (t1, y1) = window[1];
        // Each step is shorter than the whole grid, so it fits
        let step = (t1 - t0) as f64;
        for t in t0..t1 {
            grid.push(y0 + (y1 - y0) * (t - t0) as f64 / step);
        }
    }
    grid.push(knots[knots.len() - 1].1);
    grid
}

/// Exponentially weighted moving average with decay `alpha = 2 / (span + 1)`.
///
/// Weights are normalized by their sum, so the first samples are not biased towards zero.
/// Leading missing values stay missing. A missing value after the first observation
/// decays the weights and repeats the current mean.
pub fn ewm_mean(values: &[Option<f64>], span: f64) -> Vec<Option<f64>> {
    let alpha = 2.0 / (span + 1.0);
    let decay = 1.0 - alpha;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut started = false;
    values
        .iter()
        .map(|value| match value {
            Some(x) => {
                started = true;
                numerator = x + decay * numerator;
                denominator = 1.0 + decay * denominator;
                Some(numerator / denominator)
            }
            None if started => {
                numerator *= decay;
                denominator *= decay;
                Some(numerator / denominator)
            }
            None => None,
        })
        .collect()
}

/// First difference multiplied by `scale`: value at `i` consumes `i` and `i - 1`.
/// Index 0 is always missing.
pub fn scaled_diff(values: &[Option<f64>], scale: f64) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    for window in values.windows(2) {
        out.push(match (window[0], window[1]) {
            (Some(prev), Some(cur)) => Some((cur - prev) * scale),
            _ => None,
        });
    }
    out
}

/// Value at `i` is taken from `i + shift`. Tail without a source is missing.
pub fn shift_backward(values: &[Option<f64>], shift: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| values.get(i + shift).copied().flatten())
        .collect()
}
