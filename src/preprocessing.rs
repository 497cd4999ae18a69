//! Numeric preprocessing for the engineered feature matrix.
//!
//! Provides a median imputer and a standard scaler, fitted once on the
//! training matrix and frozen afterwards. The imputer exists because rows
//! missing an optional column surface as NaN entries in the raw matrix;
//! inference rows must degrade to the training median instead of failing.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Per-column median fill values for NaN entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedianImputer {
    pub medians: Vec<f64>,
}

/// Simple standard scaler (per-column mean/std).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-9;
}

/// Fit a `MedianImputer` ignoring NaN entries; an all-NaN column gets 0.0.
pub fn fit_imputer(x: &Array2<f64>) -> MedianImputer {
    let (nrows, ncols) = x.dim();
    assert!(nrows > 0 && ncols > 0, "fit_imputer requires non-empty matrix");

    let medians = (0..ncols)
        .map(|c| {
            let mut values: Vec<f64> = (0..nrows)
                .map(|r| x[(r, c)])
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                return 0.0;
            }
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let mid = values.len() / 2;
            if values.len() % 2 == 0 {
                (values[mid - 1] + values[mid]) / 2.0
            } else {
                values[mid]
            }
        })
        .collect();

    MedianImputer { medians }
}

/// Replace non-finite entries with the fitted column medians.
pub fn impute_all(x: &Array2<f64>, imputer: &MedianImputer) -> Array2<f64> {
    let mut out = x.clone();
    for ((_, c), v) in out.indexed_iter_mut() {
        if !v.is_finite() {
            *v = imputer.medians[c];
        }
    }
    out
}

/// Fit a `Scaler` from a matrix where rows are samples and columns are
/// features. The matrix must already be imputed (no NaN entries).
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    let (nrows, ncols) = x.dim();
    assert!(nrows > 0 && ncols > 0, "fit_scaler requires non-empty matrix");

    let mut mean = vec![0.0f64; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            mean[c] += x[(r, c)];
        }
    }
    let nrows_f = nrows as f64;
    for v in mean.iter_mut() {
        *v /= nrows_f;
    }

    let mut std = vec![0.0f64; ncols];
    for r in 0..nrows {
        for c in 0..ncols {
            let d = x[(r, c)] - mean[c];
            std[c] += d * d;
        }
    }
    for v in std.iter_mut() {
        *v = (*v / nrows_f).sqrt().max(Scaler::MIN_STD);
    }

    Scaler { mean, std }
}

/// Transform all rows using the provided `Scaler`.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    let mut out = x.clone();
    for ((_, c), v) in out.indexed_iter_mut() {
        *v = (*v - sc.mean[c]) / sc.std[c];
    }
    out
}
