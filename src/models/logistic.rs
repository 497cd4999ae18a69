//! Logistic regression wrapper over `linfa-logistic`.
//!
//! Serves both as a standalone algorithm and as the stacking meta-model.
//! Coefficient magnitudes double as feature importances, mirroring what the
//! tree models expose.

use linfa::prelude::*;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::params::ModelParams;

#[derive(Debug, Serialize, Deserialize)]
pub struct LogisticClassifier {
    model: FittedLogisticRegression<f64, usize>,
    params: ModelParams,
    /// linfa chooses the internal positive class from the label encoding;
    /// when the fitted orientation tracks unemployment we flip the output.
    flip: bool,
}

impl LogisticClassifier {
    pub fn fit(params: &ModelParams, x: &Array2<f64>, y: &[bool]) -> anyhow::Result<Self> {
        let (max_iterations, l2_penalty) = match params {
            ModelParams::Logistic {
                max_iterations,
                l2_penalty,
            } => (*max_iterations, *l2_penalty),
            other => anyhow::bail!("expected logistic params, got {:?}", other.kind().name()),
        };
        if x.nrows() != y.len() {
            return Err(PredictorError::LengthMismatch {
                expected: x.nrows(),
                actual: y.len(),
            }
            .into());
        }
        let n_pos = y.iter().filter(|&&t| t).count();
        if n_pos == 0 || n_pos == y.len() {
            return Err(PredictorError::SingleClass.into());
        }

        let targets = Array1::from_iter(y.iter().map(|&b| b as usize));
        let dataset = Dataset::new(x.clone(), targets);
        let model = LogisticRegression::default()
            .max_iterations(max_iterations)
            .alpha(l2_penalty)
            .fit(&dataset)?;

        // Orient the probability column against the training labels.
        let raw = model.predict_probabilities(x);
        let mean_pos: f64 = y
            .iter()
            .zip(raw.iter())
            .filter(|(t, _)| **t)
            .map(|(_, p)| *p)
            .sum::<f64>()
            / n_pos as f64;
        let mean_neg: f64 = y
            .iter()
            .zip(raw.iter())
            .filter(|(t, _)| !**t)
            .map(|(_, p)| *p)
            .sum::<f64>()
            / (y.len() - n_pos) as f64;
        let flip = mean_pos < mean_neg;

        Ok(LogisticClassifier {
            model,
            params: params.clone(),
            flip,
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Absolute coefficient per feature, used as the importance vector.
    pub fn coefficient_magnitudes(&self) -> Vec<f64> {
        self.model.params().iter().map(|c| c.abs()).collect()
    }

    /// Signed coefficients of the fitted model (meta-model weights).
    pub fn coefficients(&self) -> Vec<f64> {
        let sign = if self.flip { -1.0 } else { 1.0 };
        self.model.params().iter().map(|c| c * sign).collect()
    }
}

impl ClassifierModel for LogisticClassifier {
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
        let raw = self.model.predict_probabilities(x);
        Ok(if self.flip {
            raw.mapv(|p| 1.0 - p)
        } else {
            raw
        })
    }

    fn name(&self) -> &str {
        self.params.kind().name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::params::ModelKind;

    fn noisy_linear() -> (Array2<f64>, Vec<bool>) {
        let n = 60;
        let mut data = Vec::with_capacity(n * 2);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let v = (i as f64) / n as f64 - 0.5;
            let wiggle = ((i * 13) % 7) as f64 / 70.0;
            data.push(v + wiggle);
            data.push(wiggle);
            labels.push(v > 0.0);
        }
        (Array2::from_shape_vec((n, 2), data).unwrap(), labels)
    }

    #[test]
    fn probabilities_track_positive_class() {
        let (x, y) = noisy_linear();
        let params = ModelParams::default_for(ModelKind::Logistic);
        let model = LogisticClassifier::fit(&params, &x, &y).unwrap();
        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        let auc = crate::stats::roc_auc(&y, &proba);
        assert!(auc > 0.9, "auc = {}", auc);
    }

    #[test]
    fn single_class_labels_are_rejected() {
        let x = Array2::zeros((4, 2));
        let y = vec![true, true, true, true];
        let params = ModelParams::default_for(ModelKind::Logistic);
        let err = LogisticClassifier::fit(&params, &x, &y).unwrap_err();
        assert_eq!(
            err.downcast_ref::<PredictorError>(),
            Some(&PredictorError::SingleClass)
        );
    }

    #[test]
    fn coefficient_magnitudes_match_feature_count() {
        let (x, y) = noisy_linear();
        let params = ModelParams::default_for(ModelKind::Logistic);
        let model = LogisticClassifier::fit(&params, &x, &y).unwrap();
        assert_eq!(model.coefficient_magnitudes().len(), 2);
        // The first feature carries the signal.
        let coefs = model.coefficient_magnitudes();
        assert!(coefs[0] > coefs[1]);
    }
}
