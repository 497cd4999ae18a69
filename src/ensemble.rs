//! Stacking ensemble over the tuned base algorithms.
//!
//! Three tuned bases feed a logistic meta-model. The meta-model is trained
//! on out-of-fold scores from the uncalibrated base estimators, then every
//! base is refit on the full matrix for prediction. Calibration stays inside
//! each `TunedClassifier`; the stack itself works on raw scores.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::{fit_model, FittedModel};
use crate::models::logistic::LogisticClassifier;
use crate::models::params::{ModelKind, ModelParams};
use crate::models::tuned::TunedClassifier;
use crate::stats::stratified_kfold;

/// Base algorithms of the stack, in meta-feature column order.
pub const ENSEMBLE_KINDS: [ModelKind; 3] = [
    ModelKind::ExtremeBoost,
    ModelKind::LightBoost,
    ModelKind::RandomForest,
];

/// Folds used to build the meta-model's training scores.
pub const STACKING_FOLDS: usize = 3;

#[derive(Serialize, Deserialize)]
pub struct EnsemblePredictor {
    /// Tuned bases, kept for importances and per-base CV scores.
    base_models: Vec<TunedClassifier>,
    /// Uncalibrated full-data refits that produce the meta features.
    stacked_bases: Vec<FittedModel>,
    meta_model: LogisticClassifier,
}

impl EnsemblePredictor {
    pub fn fit(
        x: &Array2<f64>,
        y: &[bool],
        search_trials: usize,
        cv_folds: usize,
        seed: u64,
    ) -> anyhow::Result<Self> {
        let mut base_models = Vec::with_capacity(ENSEMBLE_KINDS.len());
        for (bi, kind) in ENSEMBLE_KINDS.iter().enumerate() {
            log::info!("ensemble: tuning base model {}", kind.name());
            let tuned = TunedClassifier::fit(
                *kind,
                x,
                y,
                search_trials,
                cv_folds,
                seed.wrapping_add(bi as u64 * 101),
            )?;
            base_models.push(tuned);
        }

        // Out-of-fold meta features: one column per base, each row scored by
        // a base model fit without that row.
        let folds = stratified_kfold(y, STACKING_FOLDS, seed);
        let mut meta = Array2::zeros((y.len(), ENSEMBLE_KINDS.len()));
        for (fi, (train_idx, test_idx)) in folds.iter().enumerate() {
            let x_train = x.select(Axis(0), train_idx);
            let y_train: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();
            let x_test = x.select(Axis(0), test_idx);

            for (bi, tuned) in base_models.iter().enumerate() {
                let fold_model = fit_model(
                    tuned.params(),
                    &x_train,
                    &y_train,
                    seed.wrapping_add((fi * 7 + bi) as u64),
                )?;
                let proba = fold_model.predict_proba(&x_test)?;
                for (&row, &p) in test_idx.iter().zip(proba.iter()) {
                    meta[[row, bi]] = p;
                }
            }
        }

        let meta_params = ModelParams::default_for(ModelKind::Logistic);
        let meta_model = LogisticClassifier::fit(&meta_params, &meta, y)?;

        let mut stacked_bases = Vec::with_capacity(ENSEMBLE_KINDS.len());
        for (bi, tuned) in base_models.iter().enumerate() {
            stacked_bases.push(fit_model(
                tuned.params(),
                x,
                y,
                seed.wrapping_add(bi as u64),
            )?);
        }

        Ok(EnsemblePredictor {
            base_models,
            stacked_bases,
            meta_model,
        })
    }

    pub fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
        let mut meta = Array2::zeros((x.nrows(), self.stacked_bases.len()));
        for (bi, base) in self.stacked_bases.iter().enumerate() {
            let proba = base.predict_proba(x)?;
            meta.column_mut(bi).assign(&proba);
        }
        self.meta_model.predict_proba(&meta)
    }

    pub fn base_models(&self) -> &[TunedClassifier] {
        &self.base_models
    }

    /// Meta-model coefficient per base, keyed by algorithm name.
    pub fn model_weights(&self) -> Vec<(String, f64)> {
        ENSEMBLE_KINDS
            .iter()
            .zip(self.meta_model.coefficients())
            .map(|(kind, w)| (kind.name().to_string(), w))
            .collect()
    }

    /// Element-wise mean of the bases' importance vectors.
    pub fn averaged_importances(&self) -> Option<Vec<f64>> {
        let vectors: Vec<Option<Vec<f64>>> = self
            .base_models
            .iter()
            .map(|m| m.feature_importances().map(|v| v.to_vec()))
            .collect();
        average_importance_vectors(&vectors)
    }
}

/// Average the present importance vectors element-wise; `None` entries are
/// skipped. Returns `None` when no vector is present.
pub fn average_importance_vectors(vectors: &[Option<Vec<f64>>]) -> Option<Vec<f64>> {
    let present: Vec<&Vec<f64>> = vectors.iter().flatten().collect();
    let first = present.first()?;
    let mut sums = vec![0.0; first.len()];
    for v in &present {
        for (s, &value) in sums.iter_mut().zip(v.iter()) {
            *s += value;
        }
    }
    let count = present.len() as f64;
    Some(sums.into_iter().map(|s| s / count).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averaging_skips_missing_vectors() {
        let vectors = vec![
            Some(vec![0.1, 0.2, 0.7]),
            None,
            Some(vec![0.3, 0.3, 0.4]),
            Some(vec![0.2, 0.2, 0.6]),
        ];
        let avg = average_importance_vectors(&vectors).unwrap();
        assert!((avg[0] - 0.2).abs() < 1e-12);
        assert!((avg[1] - 0.2333333333).abs() < 1e-9);
        assert!((avg[2] - 0.5666666667).abs() < 1e-9);
    }

    #[test]
    fn averaging_nothing_yields_none() {
        assert!(average_importance_vectors(&[None, None]).is_none());
        assert!(average_importance_vectors(&[]).is_none());
    }

    fn signal_data(n: usize) -> (Array2<f64>, Vec<bool>) {
        let mut data = Vec::with_capacity(n * 3);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let positive = i % 2 == 0;
            data.push(if positive { 1.0 } else { 0.0 } + ((i * 3) % 5) as f64 * 0.02);
            data.push(((i * 7) % 11) as f64 * 0.1);
            data.push(((i * 13) % 9) as f64 * 0.1);
            labels.push(positive);
        }
        (Array2::from_shape_vec((n, 3), data).unwrap(), labels)
    }

    #[test]
    fn stack_separates_signal_data() {
        let (x, y) = signal_data(90);
        let ensemble = EnsemblePredictor::fit(&x, &y, 2, 3, 17).unwrap();
        let proba = ensemble.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
        let auc = crate::stats::roc_auc(&y, &proba);
        assert!(auc > 0.9, "auc = {}", auc);
    }

    #[test]
    fn weights_cover_every_base() {
        let (x, y) = signal_data(90);
        let ensemble = EnsemblePredictor::fit(&x, &y, 1, 3, 3).unwrap();
        let weights = ensemble.model_weights();
        assert_eq!(weights.len(), 3);
        assert_eq!(weights[0].0, "extreme_boost");
        assert_eq!(weights[1].0, "light_boost");
        assert_eq!(weights[2].0, "random_forest");
    }
}
