//! The top-level training and prediction orchestrator.
//!
//! `EmploymentPredictor` owns the whole pipeline: record repair, feature
//! engineering, model training (single tuned model or stacking ensemble),
//! held-out evaluation, and artifact persistence. It is the only type most
//! callers need.

use std::collections::BTreeMap;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::ensemble::EnsemblePredictor;
use crate::error::PredictorError;
use crate::features::FeatureEngineer;
use crate::io::{load_artifact, save_artifact};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::params::ModelKind;
use crate::models::tuned::TunedClassifier;
use crate::record::{repair_records, GraduateRecord};
use crate::stats::{evaluate_probabilities, stratified_split, ClassificationMetrics};

/// Training refuses to fit on fewer rows than this.
pub const MIN_TRAINING_ROWS: usize = 50;

#[derive(Serialize, Deserialize)]
pub struct EmploymentPredictor {
    config: TrainingConfig,
    feature_engineer: FeatureEngineer,
    model: Option<TunedClassifier>,
    ensemble: Option<EnsemblePredictor>,
    performance: BTreeMap<String, ClassificationMetrics>,
    is_trained: bool,
}

impl Default for EmploymentPredictor {
    fn default() -> Self {
        Self::new(TrainingConfig::default())
    }
}

impl EmploymentPredictor {
    pub fn new(config: TrainingConfig) -> Self {
        EmploymentPredictor {
            config,
            feature_engineer: FeatureEngineer::new(),
            model: None,
            ensemble: None,
            performance: BTreeMap::new(),
            is_trained: false,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.is_trained
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train the pipeline on labelled records.
    ///
    /// Returns `Ok(false)` without training when the data cannot support a
    /// model (too few rows, or a single outcome class). Structural problems
    /// such as missing labels or a failed fit are errors.
    pub fn train(&mut self, records: &[GraduateRecord]) -> anyhow::Result<bool> {
        let mut records = records.to_vec();
        let repaired = repair_records(&mut records);
        if repaired > 0 {
            log::info!("repaired {} training rows", repaired);
        }

        // Retraining starts from a clean slate.
        self.feature_engineer = FeatureEngineer::new();
        self.model = None;
        self.ensemble = None;
        self.performance.clear();
        self.is_trained = false;

        if records.len() < MIN_TRAINING_ROWS {
            log::warn!(
                "not enough training data: {} rows, need at least {}",
                records.len(),
                MIN_TRAINING_ROWS
            );
            return Ok(false);
        }

        let (x, labels) = self.feature_engineer.fit_transform(&records)?;
        let y = labels.ok_or(PredictorError::MissingTarget)?;

        let n_pos = y.iter().filter(|&&t| t).count();
        if n_pos == 0 || n_pos == y.len() {
            log::warn!("training labels contain a single outcome class, skipping");
            return Ok(false);
        }

        let seed = self.config.random_state;
        let (train_idx, test_idx) = stratified_split(&y, self.config.test_size, seed);
        let x_train = x.select(ndarray::Axis(0), &train_idx);
        let y_train: Vec<bool> = train_idx.iter().map(|&i| y[i]).collect();
        let x_test = x.select(ndarray::Axis(0), &test_idx);
        let y_test: Vec<bool> = test_idx.iter().map(|&i| y[i]).collect();

        if self.config.use_ensemble {
            let ensemble = EnsemblePredictor::fit(
                &x_train,
                &y_train,
                self.config.search_trials,
                self.config.cv_folds,
                seed,
            )?;
            for base in ensemble.base_models() {
                let proba = base.predict_proba(&x_test)?;
                self.performance
                    .insert(base.name().to_string(), evaluate_probabilities(&y_test, &proba));
            }
            let proba = ensemble.predict_proba(&x_test)?;
            self.performance
                .insert("ensemble".to_string(), evaluate_probabilities(&y_test, &proba));
            self.ensemble = Some(ensemble);
        } else {
            let model = TunedClassifier::fit(
                ModelKind::ExtremeBoost,
                &x_train,
                &y_train,
                self.config.search_trials,
                self.config.cv_folds,
                seed,
            )?;
            let proba = model.predict_proba(&x_test)?;
            self.performance
                .insert(model.name().to_string(), evaluate_probabilities(&y_test, &proba));
            self.model = Some(model);
        }

        for (name, metrics) in &self.performance {
            log::info!(
                "{}: accuracy {:.3} precision {:.3} recall {:.3} f1 {:.3} roc-auc {:.3}",
                name,
                metrics.accuracy,
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.roc_auc
            );
        }

        self.is_trained = true;
        Ok(true)
    }

    /// Employment probability for each record.
    pub fn predict(&self, records: &[GraduateRecord]) -> anyhow::Result<Array1<f64>> {
        if !self.is_trained {
            log::error!("predict called before training");
            return Err(PredictorError::NotTrained.into());
        }
        let x = self.feature_engineer.transform(records)?;
        match (&self.ensemble, &self.model) {
            (Some(ensemble), _) => ensemble.predict_proba(&x),
            (None, Some(model)) => model.predict_proba(&x),
            (None, None) => Err(PredictorError::NotTrained.into()),
        }
    }

    /// Employment probability for one record.
    pub fn predict_one(&self, record: &GraduateRecord) -> anyhow::Result<f64> {
        let proba = self.predict(std::slice::from_ref(record))?;
        Ok(proba[0])
    }

    /// Held-out metrics per model, keyed by algorithm name.
    pub fn model_performance(&self) -> &BTreeMap<String, ClassificationMetrics> {
        &self.performance
    }

    /// Top features by importance, descending. Ensemble importances are the
    /// element-wise mean over the tuned bases.
    pub fn feature_importance(&self, top_n: usize) -> Option<Vec<(String, f64)>> {
        let values = match (&self.ensemble, &self.model) {
            (Some(ensemble), _) => ensemble.averaged_importances()?,
            (None, Some(model)) => model.feature_importances()?.to_vec(),
            (None, None) => return None,
        };

        let mut ranked: Vec<(String, f64)> = self
            .feature_engineer
            .feature_names()
            .iter()
            .cloned()
            .zip(values)
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(top_n);
        Some(ranked)
    }

    /// Meta-model weight per ensemble base; `None` for a single model.
    pub fn model_weights(&self) -> Option<Vec<(String, f64)>> {
        self.ensemble.as_ref().map(|e| e.model_weights())
    }

    pub fn save_model(&self, path: &Path) -> anyhow::Result<()> {
        save_artifact(self, path)
    }

    pub fn load_model(path: &Path) -> anyhow::Result<Self> {
        load_artifact(path)
    }
}
