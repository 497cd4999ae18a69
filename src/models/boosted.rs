//! Gradient-boosted tree classifier backing the three boosting variants.

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::PredictorError;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::params::ModelParams;

/// A fitted boosted-trees model. Labels are encoded {-1, 1} for the
/// log-likelihood loss; `predict` then yields positive-class probabilities.
#[derive(Serialize, Deserialize)]
pub struct BoostedClassifier {
    model: GBDT,
    params: ModelParams,
}

impl BoostedClassifier {
    pub fn fit(params: &ModelParams, x: &Array2<f64>, y: &[bool]) -> anyhow::Result<Self> {
        let (iterations, max_depth, learning_rate) = match params {
            ModelParams::ExtremeBoost {
                iterations,
                max_depth,
                learning_rate,
            }
            | ModelParams::LightBoost {
                iterations,
                max_depth,
                learning_rate,
            }
            | ModelParams::GradientBoost {
                iterations,
                max_depth,
                learning_rate,
            } => (*iterations, *max_depth, *learning_rate),
            other => anyhow::bail!(
                "expected boosted-tree params, got {:?}",
                other.kind().name()
            ),
        };
        if x.nrows() == 0 {
            return Err(PredictorError::EmptyDataset.into());
        }
        if x.nrows() != y.len() {
            return Err(PredictorError::LengthMismatch {
                expected: x.nrows(),
                actual: y.len(),
            }
            .into());
        }

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_max_depth(max_depth);
        config.set_iterations(iterations);
        config.set_shrinkage(learning_rate);
        config.set_loss("LogLikelyhood");
        config.set_training_optimization_level(2);
        config.set_debug(false);

        let mut model = GBDT::new(&config);
        let mut train = DataVec::with_capacity(x.nrows());
        for (i, row) in x.outer_iter().enumerate() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            let label = if y[i] { 1.0 } else { -1.0 };
            train.push(Data::new_training_data(features, 1.0, label, None));
        }
        model.fit(&mut train);

        Ok(BoostedClassifier {
            model,
            params: params.clone(),
        })
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }
}

impl ClassifierModel for BoostedClassifier {
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
        let mut rows = DataVec::with_capacity(x.nrows());
        for row in x.outer_iter() {
            let features: Vec<f32> = row.iter().map(|&v| v as f32).collect();
            rows.push(Data::new_training_data(features, 1.0, 0.0, None));
        }
        let predictions = self.model.predict(&rows);
        Ok(Array1::from_iter(
            predictions.iter().map(|&p| (p as f64).clamp(0.0, 1.0)),
        ))
    }

    fn name(&self) -> &str {
        self.params.kind().name()
    }
}
