//! Small statistics over numeric series.

use serde::Serialize;

/// Median of `values`; the mean of the two middle elements for even lengths.
///
/// Returns NaN for empty input. NaN entries sort last.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let m = n / 2;
    if n % 2 == 0 {
        (sorted[m - 1] + sorted[m]) / 2.0
    } else {
        sorted[m]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SeriesStats {
    const NAN: SeriesStats = SeriesStats {
        min: f64::NAN,
        max: f64::NAN,
        mean: f64::NAN,
    };
}

/// Min, max and mean over the finite entries only.
pub fn series_stats(values: &[f64]) -> SeriesStats {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }
    if count == 0 {
        return SeriesStats::NAN;
    }
    SeriesStats {
        min,
        max,
        mean: sum / count as f64,
    }
}

pub fn last_of(series: Option<&[f64]>) -> Option<f64> {
    series?.last().copied()
}

/// Ordinary least squares slope of `ys` against `xs`, using centered sums.
///
/// Degenerate input (fewer than two points, zero x-variance) yields `0`.
/// Callers are expected to pass aligned slices; surplus entries of the
/// longer slice are ignored.
pub fn linear_regression_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let x0 = xs[0];
    let mean_x = xs.iter().map(|x| x - x0).sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = (x - x0) - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    if den == 0.0 { 0.0 } else { num / den }
}
