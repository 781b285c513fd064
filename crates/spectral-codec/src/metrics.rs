//! Reconstruction error metrics and summary statistics.

use serde::{Deserialize, Serialize};

fn paired<'a>(data: &'a [f32], prediction: &'a [f32]) -> impl Iterator<Item = (f64, f64)> + 'a {
    data.iter()
        .zip(prediction)
        .map(|(&d, &p)| (d as f64, p as f64))
}

fn mean_of(iter: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = iter.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Arithmetic mean.
pub fn mean(data: &[f32]) -> f64 {
    mean_of(data.iter().map(|&v| v as f64))
}

/// Population variance.
pub fn variance(data: &[f32]) -> f64 {
    let m = mean(data);
    mean_of(data.iter().map(|&v| (v as f64 - m).powi(2)))
}

/// Population standard deviation.
pub fn std_dev(data: &[f32]) -> f64 {
    variance(data).sqrt()
}

/// Mean (signed) error.
pub fn me(data: &[f32], prediction: &[f32]) -> f64 {
    mean_of(paired(data, prediction).map(|(d, p)| d - p))
}

/// Mean absolute error.
pub fn mae(data: &[f32], prediction: &[f32]) -> f64 {
    mean_of(paired(data, prediction).map(|(d, p)| (d - p).abs()))
}

/// Mean squared error.
pub fn mse(data: &[f32], prediction: &[f32]) -> f64 {
    mean_of(paired(data, prediction).map(|(d, p)| (d - p).powi(2)))
}

/// Root mean squared error.
pub fn rmse(data: &[f32], prediction: &[f32]) -> f64 {
    mse(data, prediction).sqrt()
}

/// Coefficient of determination. A constant input yields 1.0 for an exact
/// prediction and 0.0 otherwise.
pub fn r2(data: &[f32], prediction: &[f32]) -> f64 {
    let var = variance(data);
    let err = mse(data, prediction);
    if var == 0.0 {
        return if err == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - err / var
}

/// Mean absolute percentage error (as a fraction). Zero-valued samples are
/// skipped.
pub fn mape(data: &[f32], prediction: &[f32]) -> f64 {
    mean_of(
        paired(data, prediction)
            .filter(|(d, _)| *d != 0.0)
            .map(|(d, p)| ((d - p) / d).abs()),
    )
}

/// Weighted MAPE: total absolute error over total absolute magnitude.
pub fn wmape(data: &[f32], prediction: &[f32]) -> f64 {
    let (err, mag) = paired(data, prediction)
        .fold((0.0, 0.0), |(e, m), (d, p)| (e + (d - p).abs(), m + d.abs()));
    if mag == 0.0 {
        0.0
    } else {
        err / mag
    }
}

/// Symmetric MAPE (as a fraction, 0..=2).
pub fn smape(data: &[f32], prediction: &[f32]) -> f64 {
    mean_of(paired(data, prediction).map(|(d, p)| {
        let denom = (d.abs() + p.abs()) / 2.0;
        if denom == 0.0 {
            0.0
        } else {
            (d - p).abs() / denom
        }
    }))
}

/// Linear-interpolated quantile of a sample (`q` in 0..=1).
///
/// Returns 0.0 for an empty sample.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Error statistics of a reconstruction against its source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    pub std: f64,
    pub me: f64,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
    pub mape: f64,
    pub wmape: f64,
    pub smape: f64,
}

impl ErrorMetrics {
    pub fn compute(data: &[f32], prediction: &[f32]) -> Self {
        Self {
            std: std_dev(data),
            me: me(data, prediction),
            mae: mae(data, prediction),
            rmse: rmse(data, prediction),
            r2: r2(data, prediction),
            mape: mape(data, prediction),
            wmape: wmape(data, prediction),
            smape: smape(data, prediction),
        }
    }
}
