//! Model construction: dispatch hyper-parameters to the matching backend.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::models::boosted::BoostedClassifier;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::forest::RandomForestClassifier;
use crate::models::logistic::LogisticClassifier;
use crate::models::params::ModelParams;

/// A fitted model of any supported kind. The closed enum keeps the whole
/// artifact serializable, which boxed trait objects would not.
#[derive(Serialize, Deserialize)]
pub enum FittedModel {
    Boosted(BoostedClassifier),
    Forest(RandomForestClassifier),
    Logistic(LogisticClassifier),
}

/// Fit a model for the given hyper-parameters. `seed` only affects the
/// backends that resample internally (random forest).
pub fn fit_model(
    params: &ModelParams,
    x: &Array2<f64>,
    y: &[bool],
    seed: u64,
) -> anyhow::Result<FittedModel> {
    let fitted = match params {
        ModelParams::ExtremeBoost { .. }
        | ModelParams::LightBoost { .. }
        | ModelParams::GradientBoost { .. } => {
            FittedModel::Boosted(BoostedClassifier::fit(params, x, y)?)
        }
        ModelParams::RandomForest { .. } => {
            FittedModel::Forest(RandomForestClassifier::fit(params, x, y, seed)?)
        }
        ModelParams::Logistic { .. } => FittedModel::Logistic(LogisticClassifier::fit(params, x, y)?),
    };
    Ok(fitted)
}

impl ClassifierModel for FittedModel {
    fn predict_proba(&self, x: &Array2<f64>) -> anyhow::Result<Array1<f64>> {
        match self {
            FittedModel::Boosted(m) => m.predict_proba(x),
            FittedModel::Forest(m) => m.predict_proba(x),
            FittedModel::Logistic(m) => m.predict_proba(x),
        }
    }

    fn name(&self) -> &str {
        match self {
            FittedModel::Boosted(m) => m.name(),
            FittedModel::Forest(m) => m.name(),
            FittedModel::Logistic(m) => m.name(),
        }
    }
}

impl FittedModel {
    pub fn params(&self) -> &ModelParams {
        match self {
            FittedModel::Boosted(m) => m.params(),
            FittedModel::Forest(m) => m.params(),
            FittedModel::Logistic(m) => m.params(),
        }
    }
}
